use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::finance_data::FinanceData;
use crate::models::money::round_money;
use crate::models::transaction::{NewTransaction, Transaction, TransactionKind};
use crate::services::goal_service::GoalService;

/// Records transactions and keeps the cached balance in step with them.
///
/// Pure business logic, no I/O. The balance is maintained incrementally;
/// only `set_initial_balance` walks the whole history.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Validate and record a transaction, newest first.
    ///
    /// The amount is rounded to cents before validation, so `0.004` is
    /// rejected as zero. A `goal_id` that matches no goal is kept on the
    /// transaction but moves no goal. A balance that would leave the
    /// `Decimal` range is rejected and nothing is recorded.
    pub fn add_transaction(
        &self,
        data: &mut FinanceData,
        input: NewTransaction,
        now: DateTime<Utc>,
    ) -> Result<Transaction, CoreError> {
        let amount = Self::validate_amount(input.amount)?;
        let signed = match input.kind {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        };
        let balance = data.current_balance.checked_add(signed).ok_or_else(|| {
            CoreError::Validation(format!(
                "Transaction amount {amount} would overflow the balance {}",
                data.current_balance
            ))
        })?;

        let transaction = Transaction {
            id: Uuid::new_v4().to_string(),
            kind: input.kind,
            amount,
            category: input.category,
            category_name: input.category_name,
            description: input.description,
            date: input.date.unwrap_or(now),
            goal_id: input.goal_id,
        };

        data.current_balance = round_money(balance);

        if let Some(goal_id) = &transaction.goal_id {
            if let Some(goal) = data.goals.iter_mut().find(|g| &g.id == goal_id) {
                GoalService::adjust_current_amount(goal, signed);
            }
        }

        data.transactions.insert(0, transaction.clone());
        Ok(transaction)
    }

    /// Set the baseline and recompute the balance over the full history.
    /// Leaves `data` untouched when the result would overflow.
    pub fn set_initial_balance(&self, data: &mut FinanceData, balance: Decimal) -> Result<(), CoreError> {
        let balance = round_money(balance);
        let current = Self::net(data)?.checked_add(balance).ok_or_else(|| {
            CoreError::Validation(format!("Initial balance {balance} would overflow the balance"))
        })?;
        data.initial_balance = balance;
        data.current_balance = round_money(current);
        Ok(())
    }

    /// Drop every transaction and fall back to the baseline.
    /// Goals and categories are left alone.
    pub fn start_new_month(&self, data: &mut FinanceData) {
        data.transactions.clear();
        data.current_balance = data.initial_balance;
    }

    /// Σincome − Σexpense over every stored transaction.
    pub fn net(data: &FinanceData) -> Result<Decimal, CoreError> {
        data.transactions
            .iter()
            .try_fold(Decimal::ZERO, |acc, t| acc.checked_add(t.signed_amount()))
            .ok_or_else(|| CoreError::Validation("Transaction total is out of range".to_string()))
    }

    fn validate_amount(amount: Decimal) -> Result<Decimal, CoreError> {
        let rounded = round_money(amount);
        if rounded <= Decimal::ZERO {
            return Err(CoreError::Validation(format!(
                "Invalid transaction amount: {amount} (must be greater than zero)"
            )));
        }
        Ok(rounded)
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
