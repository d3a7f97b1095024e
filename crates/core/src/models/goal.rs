use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::date_format;

/// A savings goal the user is working towards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialGoal {
    pub id: String,
    pub title: String,
    pub target_amount: Decimal,

    /// Never below zero
    pub current_amount: Decimal,

    #[serde(deserialize_with = "date_format::deserialize_date")]
    pub deadline: NaiveDate,
    #[serde(deserialize_with = "date_format::deserialize_datetime")]
    pub created_at: DateTime<Utc>,
}

/// Input for creating a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub title: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: NaiveDate,
}

impl NewGoal {
    pub fn new(title: impl Into<String>, target_amount: Decimal, deadline: NaiveDate) -> Self {
        Self {
            title: title.into(),
            target_amount,
            current_amount: Decimal::ZERO,
            deadline,
        }
    }

    #[must_use]
    pub fn with_current_amount(mut self, current_amount: Decimal) -> Self {
        self.current_amount = current_amount;
        self
    }
}

/// Partial update of a goal. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub target_amount: Option<Decimal>,
    pub current_amount: Option<Decimal>,
    pub deadline: Option<NaiveDate>,
}

/// Derived progress figures for one goal, as shown on the goals card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalProgress {
    pub goal_id: String,

    /// current / target × 100, uncapped (can exceed 100, up to `Decimal::MAX`)
    pub progress_pct: Decimal,

    /// target − current, floored at zero
    pub remaining: Decimal,

    /// Whole days until the deadline, rounded up; negative once overdue
    pub days_left: i64,

    /// Amount to save per 30-day month to hit the target on time
    pub monthly_need: Decimal,

    pub achieved: bool,
}
