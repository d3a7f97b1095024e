use std::sync::Arc;

use log::{debug, error, warn};
use rust_decimal::Decimal;

use crate::models::settings::{Currency, Language, PreferenceKeys, Preferences};
use crate::storage::traits::KeyValueStorage;

/// Display language and currency, each persisted as a single scalar key.
///
/// Unreadable or unknown stored codes fall back to the defaults; write
/// failures are logged and the in-memory choice stays in effect.
pub struct PreferenceStore {
    storage: Arc<dyn KeyValueStorage>,
    keys: PreferenceKeys,
    current: Preferences,
}

impl PreferenceStore {
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::load_with_keys(storage, PreferenceKeys::default())
    }

    pub fn load_with_keys(storage: Arc<dyn KeyValueStorage>, keys: PreferenceKeys) -> Self {
        let mut current = Preferences::default();

        if let Some(code) = read_scalar(storage.as_ref(), &keys.language) {
            match Language::from_code(&code) {
                Some(language) => current.language = language,
                None => warn!("Ignoring unknown stored language '{code}'"),
            }
        }
        if let Some(code) = read_scalar(storage.as_ref(), &keys.currency) {
            match Currency::from_code(&code) {
                Some(currency) => current.currency = currency,
                None => warn!("Ignoring unknown stored currency '{code}'"),
            }
        }

        Self {
            storage,
            keys,
            current,
        }
    }

    #[must_use]
    pub fn preferences(&self) -> Preferences {
        self.current
    }

    #[must_use]
    pub fn language(&self) -> Language {
        self.current.language
    }

    #[must_use]
    pub fn currency(&self) -> Currency {
        self.current.currency
    }

    pub fn set_language(&mut self, language: Language) {
        self.current.language = language;
        write_scalar(self.storage.as_ref(), &self.keys.language, language.code());
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.current.currency = currency;
        write_scalar(self.storage.as_ref(), &self.keys.currency, currency.code());
    }

    /// Format an amount in the selected display currency.
    #[must_use]
    pub fn format_amount(&self, amount: Decimal) -> String {
        self.current.currency.format_amount(amount)
    }
}

impl std::fmt::Debug for PreferenceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreferenceStore")
            .field("keys", &self.keys)
            .field("current", &self.current)
            .finish()
    }
}

fn read_scalar(storage: &dyn KeyValueStorage, key: &str) -> Option<String> {
    match storage.get_item(key) {
        Ok(value) => value,
        Err(e) => {
            warn!("Failed to read preference '{key}': {e}");
            None
        }
    }
}

fn write_scalar(storage: &dyn KeyValueStorage, key: &str, value: &str) {
    match storage.set_item(key, value) {
        Ok(()) => debug!("Saved preference {key}={value}"),
        Err(e) => error!("Failed to save preference '{key}': {e}"),
    }
}
