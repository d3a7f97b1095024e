use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dashboard figures for the current calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    /// Sum of this month's income transactions
    pub total_income: Decimal,

    /// Sum of this month's expense transactions
    pub total_expenses: Decimal,

    /// The all-time cached balance, not a month-scoped one
    pub balance: Decimal,

    /// max(0, (income − expenses) / income × 100), or 0 without income.
    /// Kept at full precision; round for display only.
    pub savings_rate: Decimal,
}

/// How close an expense category is to its monthly limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BudgetStatus {
    /// Under 70% of the limit, or no limit set
    Healthy,
    /// 70% or more
    Warning,
    /// 90% or more
    Critical,
    /// Above 100%
    OverBudget,
}

impl BudgetStatus {
    #[must_use]
    pub fn from_used_pct(used_pct: Decimal) -> Self {
        if used_pct > Decimal::ONE_HUNDRED {
            BudgetStatus::OverBudget
        } else if used_pct >= Decimal::new(90, 0) {
            BudgetStatus::Critical
        } else if used_pct >= Decimal::new(70, 0) {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Healthy
        }
    }
}

/// Spend against limit for one expense category in the current month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBudget {
    pub category_id: String,
    pub name: String,
    pub spent: Decimal,
    pub limit: Option<Decimal>,

    /// spent / limit × 100, rounded to cents; 0 without a limit.
    /// `Decimal::MAX` when the ratio is out of range.
    pub used_pct: Decimal,

    pub status: BudgetStatus,

    /// spent − limit when over budget, otherwise 0
    pub exceeded_by: Decimal,
}
