use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::transaction::TransactionKind;

/// Which of the two category lists an operation targets.
/// Income and expense categories share the transaction kinds.
pub type CategoryKind = TransactionKind;

/// A user-visible bucket for transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,

    /// Icon tag understood by the rendering layer (e.g., "Coffee")
    pub icon: String,

    /// Color tag understood by the rendering layer (e.g., "bg-category-food")
    pub color: String,

    /// Monthly spending limit. Only meaningful for expense categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Decimal>,
}

impl Category {
    fn preset(id: &str, name: &str, icon: &str, color: &str, limit: Option<Decimal>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            icon: icon.to_string(),
            color: color.to_string(),
            limit,
        }
    }
}

/// Input for creating a category.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub icon: String,
    pub color: String,
    pub limit: Option<Decimal>,
}

impl NewCategory {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            color: color.into(),
            limit: None,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: Decimal) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Partial update of a category. `limit: Some(None)` clears the limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub limit: Option<Option<Decimal>>,
}

/// The five built-in income categories. None carry a limit.
pub fn default_income_categories() -> Vec<Category> {
    vec![
        Category::preset("salary", "Salary", "Wallet", "bg-income-salary", None),
        Category::preset("freelance", "Freelance", "Briefcase", "bg-income-freelance", None),
        Category::preset("investment", "Investment", "TrendingUp", "bg-income-investment", None),
        Category::preset("gift", "Gift", "Gift", "bg-income-gift", None),
        Category::preset("other_income", "Other", "Plus", "bg-income-other", None),
    ]
}

/// The six built-in expense categories, each with its own monthly limit.
pub fn default_expense_categories() -> Vec<Category> {
    vec![
        Category::preset("food", "Food", "Coffee", "bg-category-food", Some(Decimal::new(3000, 0))),
        Category::preset("transport", "Transport", "Car", "bg-category-transport", Some(Decimal::new(1500, 0))),
        Category::preset("housing", "Housing", "Home", "bg-category-housing", Some(Decimal::new(5000, 0))),
        Category::preset(
            "entertainment",
            "Entertainment",
            "Gamepad2",
            "bg-category-entertainment",
            Some(Decimal::new(1000, 0)),
        ),
        Category::preset("health", "Health", "Heart", "bg-category-health", Some(Decimal::new(800, 0))),
        Category::preset("shopping", "Shopping", "ShoppingBag", "bg-category-shopping", Some(Decimal::new(2000, 0))),
    ]
}
