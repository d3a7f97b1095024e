use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::finance_data::FinanceData;
use crate::models::money::round_money;
use crate::models::stats::{BudgetStatus, CategoryBudget, MonthlyStats};
use crate::models::transaction::{Transaction, TransactionKind};

/// Read-only aggregations over the transaction list.
///
/// Everything here is scoped to the calendar month containing `month`,
/// compared in UTC. Nothing mutates `FinanceData`.
pub struct StatsService;

impl StatsService {
    pub fn new() -> Self {
        Self
    }

    /// Income, expenses and savings rate for the month, plus the all-time balance.
    #[must_use]
    pub fn monthly_stats(&self, data: &FinanceData, month: NaiveDate) -> MonthlyStats {
        let mut total_income = Decimal::ZERO;
        let mut total_expenses = Decimal::ZERO;

        for t in Self::in_month(data, month) {
            match t.kind {
                TransactionKind::Income => total_income = total_income.saturating_add(t.amount),
                TransactionKind::Expense => total_expenses = total_expenses.saturating_add(t.amount),
            }
        }

        // Only computed while expenses < income, so the ratio stays in (0, 1].
        let savings_rate = if total_income > total_expenses {
            (total_income - total_expenses) / total_income * Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };

        MonthlyStats {
            total_income,
            total_expenses,
            balance: data.current_balance,
            savings_rate,
        }
    }

    /// Expenses booked against `category_id` this month.
    #[must_use]
    pub fn category_spending(&self, data: &FinanceData, category_id: &str, month: NaiveDate) -> Decimal {
        Self::in_month(data, month)
            .filter(|t| t.kind == TransactionKind::Expense && t.category == category_id)
            .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
    }

    /// Spend against limit for every expense category, in list order.
    #[must_use]
    pub fn category_budgets(&self, data: &FinanceData, month: NaiveDate) -> Vec<CategoryBudget> {
        let spent_by_category = Self::expenses_by_category_id(data, month);

        data.expense_categories
            .iter()
            .map(|category| {
                let spent = spent_by_category
                    .get(category.id.as_str())
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                let used_pct = match category.limit {
                    Some(limit) if limit > Decimal::ZERO => spent
                        .checked_div(limit)
                        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                        .map_or(Decimal::MAX, round_money),
                    _ => Decimal::ZERO,
                };
                let exceeded_by = match category.limit {
                    Some(limit) if spent > limit => spent.saturating_sub(limit),
                    _ => Decimal::ZERO,
                };
                CategoryBudget {
                    category_id: category.id.clone(),
                    name: category.name.clone(),
                    spent,
                    limit: category.limit,
                    used_pct,
                    status: BudgetStatus::from_used_pct(used_pct),
                    exceeded_by,
                }
            })
            .collect()
    }

    /// This month's expenses keyed by the transactions' category display
    /// name, largest first. Ties keep name order.
    #[must_use]
    pub fn expenses_by_category(&self, data: &FinanceData, month: NaiveDate) -> Vec<(String, Decimal)> {
        let mut totals: HashMap<&str, Decimal> = HashMap::new();
        for t in Self::in_month(data, month).filter(|t| t.kind == TransactionKind::Expense) {
            let total = totals.entry(t.category_name.as_str()).or_insert(Decimal::ZERO);
            *total = total.saturating_add(t.amount);
        }

        let mut breakdown: Vec<(String, Decimal)> = totals
            .into_iter()
            .map(|(name, amount)| (name.to_string(), amount))
            .collect();
        breakdown.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        breakdown
    }

    fn expenses_by_category_id(data: &FinanceData, month: NaiveDate) -> HashMap<&str, Decimal> {
        let mut totals: HashMap<&str, Decimal> = HashMap::new();
        for t in Self::in_month(data, month).filter(|t| t.kind == TransactionKind::Expense) {
            let total = totals.entry(t.category.as_str()).or_insert(Decimal::ZERO);
            *total = total.saturating_add(t.amount);
        }
        totals
    }

    fn in_month(data: &FinanceData, month: NaiveDate) -> impl Iterator<Item = &Transaction> {
        data.transactions
            .iter()
            .filter(move |t| Self::same_month(&t.date, month))
    }

    fn same_month(date: &DateTime<Utc>, month: NaiveDate) -> bool {
        date.year() == month.year() && date.month() == month.month()
    }
}

impl Default for StatsService {
    fn default() -> Self {
        Self::new()
    }
}
