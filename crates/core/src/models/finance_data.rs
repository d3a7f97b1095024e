use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::category::{default_expense_categories, default_income_categories, Category};
use super::goal::FinancialGoal;
use super::transaction::Transaction;
use crate::errors::CoreError;

/// The aggregate root. Everything in here is serialized as one JSON
/// snapshot under a single storage key.
///
/// `current_balance` is a cached value: it always equals
/// `initial_balance + Σincome − Σexpense` over `transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceData {
    /// User-set baseline
    #[serde(default)]
    pub initial_balance: Decimal,

    #[serde(default)]
    pub current_balance: Decimal,

    /// Newest first
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    /// In creation order
    #[serde(default)]
    pub goals: Vec<FinancialGoal>,

    pub income_categories: Vec<Category>,
    pub expense_categories: Vec<Category>,
}

impl Default for FinanceData {
    fn default() -> Self {
        Self {
            initial_balance: Decimal::ZERO,
            current_balance: Decimal::ZERO,
            transactions: Vec::new(),
            goals: Vec::new(),
            income_categories: default_income_categories(),
            expense_categories: default_expense_categories(),
        }
    }
}

impl FinanceData {
    /// Serialize to the persisted JSON layout.
    pub fn to_snapshot(&self) -> Result<String, CoreError> {
        serde_json::to_string(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize finance data: {e}")))
    }
}

/// Snapshot written before income and expense categories were split:
/// one flat `categories` list that held expense categories only.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyFinanceData {
    #[serde(default)]
    pub initial_balance: Decimal,
    #[serde(default)]
    pub current_balance: Decimal,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    #[serde(default)]
    pub goals: Vec<FinancialGoal>,
    #[serde(default)]
    pub categories: Option<Vec<Category>>,
}

/// Every snapshot shape ever written under the finance data key.
///
/// A snapshot is `Current` only when it carries both category lists;
/// anything else that is still a JSON object is treated as `Legacy`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StoredFinanceData {
    Current(FinanceData),
    Legacy(LegacyFinanceData),
}

impl StoredFinanceData {
    /// Parse a raw snapshot without normalizing it.
    pub fn parse(json: &str) -> Result<Self, CoreError> {
        serde_json::from_str(json)
            .map_err(|e| CoreError::Deserialization(format!("Unreadable finance snapshot: {e}")))
    }

    #[must_use]
    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredFinanceData::Legacy(_))
    }

    /// Normalize to the current in-memory shape.
    ///
    /// A legacy flat list becomes the expense categories and the default
    /// income categories are injected; a legacy snapshot without any list
    /// gets both default sets. Transactions, goals and balances pass
    /// through untouched.
    #[must_use]
    pub fn migrate(self) -> FinanceData {
        match self {
            StoredFinanceData::Current(data) => data,
            StoredFinanceData::Legacy(legacy) => FinanceData {
                initial_balance: legacy.initial_balance,
                current_balance: legacy.current_balance,
                transactions: legacy.transactions,
                goals: legacy.goals,
                income_categories: default_income_categories(),
                expense_categories: legacy
                    .categories
                    .unwrap_or_else(default_expense_categories),
            },
        }
    }
}
