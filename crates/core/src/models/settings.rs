use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::money::round_money;

/// Display language of the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    Ua,
    Pl,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Ua, Language::Pl];

    /// Storage code (`en`, `ua`, `pl`).
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ua => "ua",
            Language::Pl => "pl",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Display currency. Amounts are never converted, only labelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    #[default]
    Uah,
    Pln,
    Gbp,
}

impl Currency {
    pub const ALL: [Currency; 5] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Uah,
        Currency::Pln,
        Currency::Gbp,
    ];

    /// ISO 4217 code, as stored.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Uah => "UAH",
            Currency::Pln => "PLN",
            Currency::Gbp => "GBP",
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Uah => "₴",
            Currency::Pln => "zł",
            Currency::Gbp => "£",
        }
    }

    #[must_use]
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }

    /// Symbol followed by the amount with exactly two decimals, e.g. `₴1250.50`.
    #[must_use]
    pub fn format_amount(&self, amount: Decimal) -> String {
        let mut rounded = round_money(amount);
        rounded.rescale(2);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{}{}", self.symbol(), rounded.abs())
        } else {
            format!("{}{}", self.symbol(), rounded.abs())
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The user's display preferences. Persisted as two scalar keys, not
/// inside the finance snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub language: Language,
    pub currency: Currency,
}

/// Storage keys used for the preference scalars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceKeys {
    pub language: String,
    pub currency: String,
}

impl Default for PreferenceKeys {
    fn default() -> Self {
        Self {
            language: "smf_locale".to_string(),
            currency: "smf_currency".to_string(),
        }
    }
}

/// Construction-time configuration of a `FinanceStore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Storage key the finance snapshot lives under
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: "smf_finance_data".to_string(),
        }
    }
}

impl StoreConfig {
    /// Where an unreadable snapshot is set aside before defaults replace it.
    #[must_use]
    pub fn backup_key(&self) -> String {
        format!("{}_unreadable", self.storage_key)
    }
}
