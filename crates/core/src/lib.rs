pub mod errors;
pub mod models;
pub mod preferences;
pub mod services;
pub mod storage;

use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;

use errors::CoreError;
use models::{
    category::{Category, CategoryKind, CategoryUpdate, NewCategory},
    finance_data::{FinanceData, StoredFinanceData},
    goal::{FinancialGoal, GoalProgress, GoalUpdate, NewGoal},
    settings::StoreConfig,
    stats::{CategoryBudget, MonthlyStats},
    transaction::{NewTransaction, Transaction},
};
use services::{
    category_service::CategoryService, goal_service::GoalService,
    ledger_service::LedgerService, stats_service::StatsService,
};
use storage::traits::{KeyValueStorage, Subscription};

/// Main entry point for the finance tracker core library.
///
/// Owns the one `FinanceData` aggregate for a view. Construct it once at
/// startup and hand out references; every mutation goes through here and is
/// mirrored to storage before the call returns.
#[must_use]
pub struct FinanceStore {
    data: FinanceData,
    config: StoreConfig,
    storage: Arc<dyn KeyValueStorage>,
    /// Change feed for writes made by other views; released on drop.
    subscription: Option<Subscription>,
    /// Unreadable snapshot still in storage with no backup copy yet.
    /// Writes are held back until it is copied to the backup key.
    unreadable: Option<String>,
    ledger_service: LedgerService,
    goal_service: GoalService,
    category_service: CategoryService,
    stats_service: StatsService,
}

impl std::fmt::Debug for FinanceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinanceStore")
            .field("storage_key", &self.config.storage_key)
            .field("current_balance", &self.data.current_balance)
            .field("transactions", &self.data.transactions.len())
            .field("goals", &self.data.goals.len())
            .field("synced", &self.subscription.is_some())
            .finish()
    }
}

impl FinanceStore {
    /// Open the store under the default storage key.
    pub fn open(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::open_with_config(storage, StoreConfig::default())
    }

    /// Load-or-default, migrate, subscribe. Never fails: unreadable
    /// snapshots fall back to the default data, and stay in storage until a
    /// copy is kept under [`StoreConfig::backup_key`].
    pub fn open_with_config(storage: Arc<dyn KeyValueStorage>, config: StoreConfig) -> Self {
        let (data, write_back) = Self::load(storage.as_ref(), &config.storage_key);
        let subscription = storage.subscribe(&config.storage_key);

        let mut store = Self {
            data,
            config,
            storage,
            subscription,
            unreadable: None,
            ledger_service: LedgerService::new(),
            goal_service: GoalService::new(),
            category_service: CategoryService::new(),
            stats_service: StatsService::new(),
        };
        match write_back {
            WriteBack::Nothing => {}
            WriteBack::Normalized => store.persist(),
            WriteBack::Unreadable(raw) => {
                store.unreadable = Some(raw);
                store.persist();
            }
        }
        store
    }

    // ── Read Model ──────────────────────────────────────────────────

    /// The current snapshot. The rendering layer reads this but never mutates it.
    pub fn data(&self) -> &FinanceData {
        &self.data
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    #[must_use]
    pub fn current_balance(&self) -> Decimal {
        self.data.current_balance
    }

    #[must_use]
    pub fn initial_balance(&self) -> Decimal {
        self.data.initial_balance
    }

    /// All transactions, newest first.
    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.data.transactions
    }

    /// The `limit` most recently recorded transactions.
    #[must_use]
    pub fn recent_transactions(&self, limit: usize) -> &[Transaction] {
        let end = limit.min(self.data.transactions.len());
        &self.data.transactions[..end]
    }

    #[must_use]
    pub fn goals(&self) -> &[FinancialGoal] {
        &self.data.goals
    }

    #[must_use]
    pub fn get_goal(&self, goal_id: &str) -> Option<&FinancialGoal> {
        self.data.goals.iter().find(|g| g.id == goal_id)
    }

    #[must_use]
    pub fn income_categories(&self) -> &[Category] {
        &self.data.income_categories
    }

    #[must_use]
    pub fn expense_categories(&self) -> &[Category] {
        &self.data.expense_categories
    }

    #[must_use]
    pub fn get_category(&self, category_id: &str, kind: CategoryKind) -> Option<&Category> {
        self.category_service
            .list(&self.data, kind)
            .iter()
            .find(|c| c.id == category_id)
    }

    // ── Balance & Transactions ──────────────────────────────────────

    /// Set the baseline; the balance becomes baseline + net of the full history.
    ///
    /// Fails with `CoreError::Validation`, leaving state untouched, when the
    /// resulting balance is out of range.
    pub fn set_initial_balance(&mut self, balance: Decimal) -> Result<(), CoreError> {
        self.ledger_service.set_initial_balance(&mut self.data, balance)?;
        self.persist();
        Ok(())
    }

    /// Record an income or expense.
    ///
    /// Fails with `CoreError::Validation` when the amount is not greater
    /// than zero after rounding to cents; state is untouched in that case.
    pub fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction, CoreError> {
        let transaction = self
            .ledger_service
            .add_transaction(&mut self.data, input, Utc::now())?;
        self.persist();
        Ok(transaction)
    }

    /// Reset everything to defaults and delete the persisted snapshot.
    pub fn clear_all_data(&mut self) {
        self.data = FinanceData::default();
        self.unreadable = None;
        if let Err(e) = self.storage.remove_item(&self.config.storage_key) {
            error!("Failed to remove finance data from storage: {e}");
        }
        info!("Cleared all finance data");
    }

    /// Empty the transaction list and fall back to the initial balance.
    /// Manual: nothing here watches the calendar.
    pub fn start_new_month(&mut self) {
        self.ledger_service.start_new_month(&mut self.data);
        self.persist();
        info!("Started a new month at balance {}", self.data.current_balance);
    }

    // ── Statistics ──────────────────────────────────────────────────

    /// Current-month income/expenses and savings rate, with the all-time balance.
    #[must_use]
    pub fn get_monthly_stats(&self) -> MonthlyStats {
        self.stats_service
            .monthly_stats(&self.data, Utc::now().date_naive())
    }

    /// Current-month expenses booked against a category.
    #[must_use]
    pub fn get_category_spending(&self, category_id: &str) -> Decimal {
        self.stats_service
            .category_spending(&self.data, category_id, Utc::now().date_naive())
    }

    /// Spend against limit for every expense category this month.
    #[must_use]
    pub fn category_budgets(&self) -> Vec<CategoryBudget> {
        self.stats_service
            .category_budgets(&self.data, Utc::now().date_naive())
    }

    /// This month's expenses per category name, largest first.
    #[must_use]
    pub fn expenses_by_category(&self) -> Vec<(String, Decimal)> {
        self.stats_service
            .expenses_by_category(&self.data, Utc::now().date_naive())
    }

    // ── Goals ───────────────────────────────────────────────────────

    pub fn add_goal(&mut self, input: NewGoal) -> FinancialGoal {
        let goal = self.goal_service.add_goal(&mut self.data, input, Utc::now());
        self.persist();
        goal
    }

    /// Merge `update` into the goal. Returns `false` (and changes nothing)
    /// when the goal does not exist.
    pub fn update_goal(&mut self, goal_id: &str, update: GoalUpdate) -> bool {
        let found = self.goal_service.update_goal(&mut self.data, goal_id, update);
        self.persist_if(found)
    }

    /// Remove a goal and unlink the transactions that referenced it.
    pub fn delete_goal(&mut self, goal_id: &str) -> bool {
        let found = self.goal_service.delete_goal(&mut self.data, goal_id);
        self.persist_if(found)
    }

    /// Adjust a goal's saved amount by a signed delta, clamped at zero.
    pub fn add_amount_to_goal(&mut self, goal_id: &str, amount: Decimal) -> bool {
        let found = self
            .goal_service
            .add_amount_to_goal(&mut self.data, goal_id, amount);
        self.persist_if(found)
    }

    #[must_use]
    pub fn goal_progress(&self, goal_id: &str) -> Option<GoalProgress> {
        self.get_goal(goal_id)
            .map(|goal| self.goal_service.progress(goal, Utc::now()))
    }

    /// Progress of every goal, in creation order.
    #[must_use]
    pub fn goals_progress(&self) -> Vec<GoalProgress> {
        let now = Utc::now();
        self.data
            .goals
            .iter()
            .map(|goal| self.goal_service.progress(goal, now))
            .collect()
    }

    #[must_use]
    pub fn achieved_goal_count(&self) -> usize {
        self.data
            .goals
            .iter()
            .filter(|g| g.current_amount >= g.target_amount)
            .count()
    }

    // ── Categories ──────────────────────────────────────────────────

    pub fn add_category(&mut self, input: NewCategory, kind: CategoryKind) -> Category {
        let category = self.category_service.add_category(&mut self.data, input, kind);
        self.persist();
        category
    }

    pub fn update_category(&mut self, category_id: &str, update: CategoryUpdate, kind: CategoryKind) -> bool {
        let found = self
            .category_service
            .update_category(&mut self.data, category_id, update, kind);
        self.persist_if(found)
    }

    /// Unconditional delete. Use [`FinanceStore::can_delete_category`]
    /// first if spent categories should be protected.
    pub fn delete_category(&mut self, category_id: &str, kind: CategoryKind) -> bool {
        let found = self
            .category_service
            .delete_category(&mut self.data, category_id, kind);
        self.persist_if(found)
    }

    /// `false` for an expense category with spend recorded this month.
    #[must_use]
    pub fn can_delete_category(&self, category_id: &str, kind: CategoryKind) -> bool {
        match kind {
            CategoryKind::Income => true,
            CategoryKind::Expense => self.get_category_spending(category_id) <= Decimal::ZERO,
        }
    }

    // ── Cross-view Sync ─────────────────────────────────────────────

    /// Apply snapshots written by other views since the last call.
    ///
    /// Last write wins: the newest snapshot written elsewhere replaces the
    /// in-memory state wholesale. Removals and malformed payloads are
    /// ignored, as is a snapshot that this view has since overwritten.
    /// Returns `true` when a snapshot was applied.
    pub fn sync_from_storage(&mut self) -> bool {
        let Some(subscription) = &self.subscription else {
            return false;
        };
        let latest = subscription
            .drain()
            .into_iter()
            .filter(|event| event.key == self.config.storage_key)
            .filter_map(|event| event.new_value)
            .filter(|value| !value.is_empty())
            .last();
        let Some(raw) = latest else {
            return false;
        };

        match self.storage.get_item(&self.config.storage_key) {
            Ok(Some(stored)) if stored != raw => {
                debug!("Skipping finance data superseded by a later write");
                return false;
            }
            Ok(_) => {}
            Err(e) => warn!("Failed to re-read finance data during sync: {e}"),
        }

        match StoredFinanceData::parse(&raw) {
            Ok(stored) => {
                self.data = stored.migrate();
                self.unreadable = None;
                debug!("Applied finance data written by another view");
                true
            }
            Err(e) => {
                error!("Ignoring malformed finance data from another view: {e}");
                false
            }
        }
    }

    // ── Export ──────────────────────────────────────────────────────

    /// Pretty-printed JSON of the whole aggregate.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(&self.data)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize finance data: {e}")))
    }

    // ── Internal ────────────────────────────────────────────────────

    /// Returns the data to use and what `open` should write back.
    fn load(storage: &dyn KeyValueStorage, key: &str) -> (FinanceData, WriteBack) {
        let raw = match storage.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => raw,
            Ok(_) => return (FinanceData::default(), WriteBack::Nothing),
            Err(e) => {
                warn!("Failed to read finance data, starting from defaults: {e}");
                return (FinanceData::default(), WriteBack::Nothing);
            }
        };

        match StoredFinanceData::parse(&raw) {
            Ok(stored) if stored.is_legacy() => {
                info!("Migrating legacy finance data to split income/expense categories");
                (stored.migrate(), WriteBack::Normalized)
            }
            Ok(stored) => (stored.migrate(), WriteBack::Nothing),
            Err(e) => {
                warn!("Stored finance data is corrupt, resetting to defaults: {e}");
                (FinanceData::default(), WriteBack::Unreadable(raw))
            }
        }
    }

    /// Mirror the aggregate to storage. Failures are logged; memory stays authoritative.
    /// Mirror the aggregate to storage. While an unreadable snapshot has no
    /// backup, the backup is attempted first and the write is skipped if it
    /// fails.
    fn persist(&mut self) {
        if let Some(raw) = &self.unreadable {
            let backup_key = self.config.backup_key();
            match self.storage.set_item(&backup_key, raw) {
                Ok(()) => {
                    info!("Kept the unreadable finance data under '{backup_key}'");
                    self.unreadable = None;
                }
                Err(e) => {
                    error!("Not saving: unreadable finance data could not be backed up: {e}");
                    return;
                }
            }
        }

        let result = self
            .data
            .to_snapshot()
            .and_then(|snapshot| self.storage.set_item(&self.config.storage_key, &snapshot));
        match result {
            Ok(()) => debug!("Persisted finance data under '{}'", self.config.storage_key),
            Err(e) => error!("Error saving finance data to storage: {e}"),
        }
    }

    fn persist_if(&mut self, changed: bool) -> bool {
        if changed {
            self.persist();
        }
        changed
    }
}

/// What opening the store owes storage after loading the snapshot.
enum WriteBack {
    Nothing,
    /// A legacy snapshot was migrated; store the current shape.
    Normalized,
    /// The snapshot could not be read; back it up before replacing it.
    Unreadable(String),
}
