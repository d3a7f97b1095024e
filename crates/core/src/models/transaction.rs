use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::date_format;

/// Direction of a transaction relative to the user's balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Money coming in, increases the balance
    Income,
    /// Money going out, decreases the balance
    Expense,
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionKind::Income => write!(f, "income"),
            TransactionKind::Expense => write!(f, "expense"),
        }
    }
}

/// A single recorded income or expense.
///
/// Immutable once stored, except that `goal_id` is cleared when the linked
/// goal is deleted. `category_name` is a snapshot taken at creation time and
/// does not follow later category renames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,

    #[serde(rename = "type")]
    pub kind: TransactionKind,

    /// Always positive, rounded to cents
    pub amount: Decimal,

    /// Category id this transaction was booked against
    pub category: String,

    /// Category display name at the time of booking
    pub category_name: String,

    #[serde(default)]
    pub description: String,

    /// Read leniently: the entry form stores bare `YYYY-MM-DD` dates
    #[serde(deserialize_with = "date_format::deserialize_datetime")]
    pub date: DateTime<Utc>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_id: Option<String>,
}

impl Transaction {
    /// Signed effect of this transaction on the balance.
    #[must_use]
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionKind::Income => self.amount,
            TransactionKind::Expense => -self.amount,
        }
    }
}

/// Input for recording a transaction. The store assigns the id, and the
/// date when none is given.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub category_name: String,
    pub description: String,
    pub date: Option<DateTime<Utc>>,
    pub goal_id: Option<String>,
}

impl NewTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: Decimal,
        category: impl Into<String>,
        category_name: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount,
            category: category.into(),
            category_name: category_name.into(),
            description: String::new(),
            date: None,
            goal_id: None,
        }
    }

    pub fn income(
        amount: Decimal,
        category: impl Into<String>,
        category_name: impl Into<String>,
    ) -> Self {
        Self::new(TransactionKind::Income, amount, category, category_name)
    }

    pub fn expense(
        amount: Decimal,
        category: impl Into<String>,
        category_name: impl Into<String>,
    ) -> Self {
        Self::new(TransactionKind::Expense, amount, category, category_name)
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Link the transaction to a savings goal.
    #[must_use]
    pub fn with_goal(mut self, goal_id: impl Into<String>) -> Self {
        self.goal_id = Some(goal_id.into());
        self
    }
}
