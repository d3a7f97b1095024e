use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::finance_data::FinanceData;
use crate::models::goal::{FinancialGoal, GoalProgress, GoalUpdate, NewGoal};
use crate::models::money::round_money;

const MILLIS_PER_DAY: i64 = 86_400_000;
const DAYS_PER_MONTH: i64 = 30;

/// Manages savings goals. Unknown goal ids are silently ignored;
/// every mutator reports whether it found its target.
pub struct GoalService;

impl GoalService {
    pub fn new() -> Self {
        Self
    }

    /// Append a goal. A negative starting amount is clamped to zero.
    pub fn add_goal(&self, data: &mut FinanceData, input: NewGoal, now: DateTime<Utc>) -> FinancialGoal {
        let goal = FinancialGoal {
            id: Uuid::new_v4().to_string(),
            title: input.title,
            target_amount: round_money(input.target_amount),
            current_amount: round_money(input.current_amount).max(Decimal::ZERO),
            deadline: input.deadline,
            created_at: now,
        };
        data.goals.push(goal.clone());
        goal
    }

    /// Merge the given fields into the goal.
    pub fn update_goal(&self, data: &mut FinanceData, goal_id: &str, update: GoalUpdate) -> bool {
        let Some(goal) = data.goals.iter_mut().find(|g| g.id == goal_id) else {
            return false;
        };
        if let Some(title) = update.title {
            goal.title = title;
        }
        if let Some(target) = update.target_amount {
            goal.target_amount = round_money(target);
        }
        if let Some(current) = update.current_amount {
            goal.current_amount = round_money(current).max(Decimal::ZERO);
        }
        if let Some(deadline) = update.deadline {
            goal.deadline = deadline;
        }
        true
    }

    /// Remove a goal and unlink every transaction that pointed at it.
    /// The transactions themselves stay.
    pub fn delete_goal(&self, data: &mut FinanceData, goal_id: &str) -> bool {
        let before = data.goals.len();
        data.goals.retain(|g| g.id != goal_id);
        if data.goals.len() == before {
            return false;
        }
        for transaction in &mut data.transactions {
            if transaction.goal_id.as_deref() == Some(goal_id) {
                transaction.goal_id = None;
            }
        }
        true
    }

    pub fn add_amount_to_goal(&self, data: &mut FinanceData, goal_id: &str, amount: Decimal) -> bool {
        match data.goals.iter_mut().find(|g| g.id == goal_id) {
            Some(goal) => {
                Self::adjust_current_amount(goal, amount);
                true
            }
            None => false,
        }
    }

    /// Shift a goal's saved amount by `delta`, never below zero.
    /// Saturates at `Decimal::MAX`.
    pub fn adjust_current_amount(goal: &mut FinancialGoal, delta: Decimal) {
        goal.current_amount = round_money(goal.current_amount.saturating_add(delta)).max(Decimal::ZERO);
    }

    /// Progress figures for a goal as of `now`.
    #[must_use]
    pub fn progress(&self, goal: &FinancialGoal, now: DateTime<Utc>) -> GoalProgress {
        let progress_pct = if goal.target_amount > Decimal::ZERO {
            goal.current_amount
                .checked_div(goal.target_amount)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
                .map_or(Decimal::MAX, round_money)
        } else {
            Decimal::ZERO
        };
        let remaining = goal.target_amount.saturating_sub(goal.current_amount).max(Decimal::ZERO);
        let days_left = Self::days_until(goal, now);
        let months_left = (Decimal::from(days_left) / Decimal::from(DAYS_PER_MONTH)).max(Decimal::ONE);

        GoalProgress {
            goal_id: goal.id.clone(),
            progress_pct,
            remaining,
            days_left,
            monthly_need: round_money(remaining / months_left),
            achieved: goal.current_amount >= goal.target_amount,
        }
    }

    /// Whole days from `now` to midnight UTC of the deadline, rounded up.
    fn days_until(goal: &FinancialGoal, now: DateTime<Utc>) -> i64 {
        let deadline = goal.deadline.and_time(chrono::NaiveTime::MIN).and_utc();
        let millis = (deadline - now).num_milliseconds();
        -(-millis).div_euclid(MILLIS_PER_DAY)
    }
}

impl Default for GoalService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn goal(target: i64, current: i64, deadline: NaiveDate) -> FinancialGoal {
        FinancialGoal {
            id: "g".into(),
            title: "Car".into(),
            target_amount: Decimal::from(target),
            current_amount: Decimal::from(current),
            deadline,
            created_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn days_until_rounds_partial_days_up() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let g = goal(100, 0, NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());
        assert_eq!(GoalService::days_until(&g, now), 2);
    }

    #[test]
    fn days_until_is_negative_when_overdue() {
        let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let g = goal(100, 0, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(GoalService::days_until(&g, now), -5);
    }

    #[test]
    fn days_until_same_instant_is_zero() {
        let now = Utc.with_ymd_and_hms(2025, 3, 5, 0, 0, 0).unwrap();
        let g = goal(100, 0, NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());
        assert_eq!(GoalService::days_until(&g, now), 0);
    }
}
