use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::category::{Category, CategoryKind, CategoryUpdate, NewCategory};
use crate::models::finance_data::FinanceData;
use crate::models::money::round_money;

/// Manages the income and expense category lists.
///
/// Deletion never looks at transactions: existing transactions keep their
/// category id and their snapshot of the display name.
pub struct CategoryService;

impl CategoryService {
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn list<'a>(&self, data: &'a FinanceData, kind: CategoryKind) -> &'a [Category] {
        match kind {
            CategoryKind::Income => &data.income_categories,
            CategoryKind::Expense => &data.expense_categories,
        }
    }

    fn list_mut<'a>(&self, data: &'a mut FinanceData, kind: CategoryKind) -> &'a mut Vec<Category> {
        match kind {
            CategoryKind::Income => &mut data.income_categories,
            CategoryKind::Expense => &mut data.expense_categories,
        }
    }

    /// Append a category to the list selected by `kind`.
    /// Income categories never carry a limit.
    pub fn add_category(&self, data: &mut FinanceData, input: NewCategory, kind: CategoryKind) -> Category {
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            icon: input.icon,
            color: input.color,
            limit: Self::normalize_limit(input.limit, kind),
        };
        self.list_mut(data, kind).push(category.clone());
        category
    }

    pub fn update_category(
        &self,
        data: &mut FinanceData,
        category_id: &str,
        update: CategoryUpdate,
        kind: CategoryKind,
    ) -> bool {
        let Some(category) = self
            .list_mut(data, kind)
            .iter_mut()
            .find(|c| c.id == category_id)
        else {
            return false;
        };
        if let Some(name) = update.name {
            category.name = name;
        }
        if let Some(icon) = update.icon {
            category.icon = icon;
        }
        if let Some(color) = update.color {
            category.color = color;
        }
        if let Some(limit) = update.limit {
            category.limit = Self::normalize_limit(limit, kind);
        }
        true
    }

    pub fn delete_category(&self, data: &mut FinanceData, category_id: &str, kind: CategoryKind) -> bool {
        let list = self.list_mut(data, kind);
        let before = list.len();
        list.retain(|c| c.id != category_id);
        list.len() != before
    }

    fn normalize_limit(limit: Option<Decimal>, kind: CategoryKind) -> Option<Decimal> {
        match kind {
            CategoryKind::Income => None,
            CategoryKind::Expense => limit.map(round_money),
        }
    }
}

impl Default for CategoryService {
    fn default() -> Self {
        Self::new()
    }
}
