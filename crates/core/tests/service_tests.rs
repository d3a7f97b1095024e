// ═══════════════════════════════════════════════════════════════════
// Service Tests: ledger, goals, categories, statistics at fixed dates
// ═══════════════════════════════════════════════════════════════════

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use finance_tracker_core::errors::CoreError;
use finance_tracker_core::models::category::{CategoryKind, CategoryUpdate, NewCategory};
use finance_tracker_core::models::finance_data::FinanceData;
use finance_tracker_core::models::goal::{GoalUpdate, NewGoal};
use finance_tracker_core::models::money::round_money;
use finance_tracker_core::models::stats::BudgetStatus;
use finance_tracker_core::models::transaction::{NewTransaction, TransactionKind};
use finance_tracker_core::services::category_service::CategoryService;
use finance_tracker_core::services::goal_service::GoalService;
use finance_tracker_core::services::ledger_service::LedgerService;
use finance_tracker_core::services::stats_service::StatsService;

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn expense(amount: Decimal, category: &str, date: DateTime<Utc>) -> NewTransaction {
    NewTransaction::expense(amount, category, category.to_uppercase()).with_date(date)
}

fn income(amount: Decimal, date: DateTime<Utc>) -> NewTransaction {
    NewTransaction::income(amount, "salary", "Salary").with_date(date)
}

// ═══════════════════════════════════════════════════════════════════
// LedgerService
// ═══════════════════════════════════════════════════════════════════

mod ledger {
    use super::*;

    #[test]
    fn add_transaction_updates_balance_incrementally() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 10);

        ledger.add_transaction(&mut data, income(dec!(1000), now), now).unwrap();
        ledger.add_transaction(&mut data, expense(dec!(250.40), "food", now), now).unwrap();

        assert_eq!(data.current_balance, dec!(749.60));
        assert_eq!(data.transactions.len(), 2);
    }

    #[test]
    fn missing_date_uses_supplied_now() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 10);
        let t = ledger
            .add_transaction(&mut data, NewTransaction::expense(dec!(1), "food", "Food"), now)
            .unwrap();
        assert_eq!(t.date, now);
    }

    #[test]
    fn ids_are_unique() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 10);
        let a = ledger.add_transaction(&mut data, income(dec!(1), now), now).unwrap();
        let b = ledger.add_transaction(&mut data, income(dec!(1), now), now).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn invalid_amount_leaves_data_untouched() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let before = data.clone();
        let now = at(2025, 3, 10);
        for amount in [dec!(0), dec!(-1), dec!(0.001)] {
            let err = ledger
                .add_transaction(&mut data, expense(amount, "food", now), now)
                .unwrap_err();
            assert!(matches!(err, CoreError::Validation(_)));
        }
        assert_eq!(data, before);
    }

    #[test]
    fn balance_overflow_is_rejected_and_leaves_data_untouched() {
        let ledger = LedgerService::new();
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 10);
        let goal = service.add_goal(&mut data, NewGoal::new("Yacht", dec!(10), day(2025, 12, 1)), now);

        ledger
            .add_transaction(&mut data, income(Decimal::MAX, now).with_goal(&goal.id), now)
            .unwrap();
        assert_eq!(data.current_balance, Decimal::MAX);
        let before = data.clone();

        let err = ledger
            .add_transaction(&mut data, income(Decimal::MAX, now).with_goal(&goal.id), now)
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(data, before);

        let err = ledger.set_initial_balance(&mut data, dec!(1)).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(data, before);
    }

    #[test]
    fn net_reports_out_of_range_history() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 10);
        let t = ledger.add_transaction(&mut data, income(Decimal::MAX, now), now).unwrap();
        data.transactions.push(t);
        assert!(matches!(LedgerService::net(&data), Err(CoreError::Validation(_))));
    }

    #[test]
    fn set_initial_balance_recomputes_over_history() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 10);
        ledger.add_transaction(&mut data, income(dec!(300), now), now).unwrap();
        ledger.add_transaction(&mut data, expense(dec!(100), "food", now), now).unwrap();

        ledger.set_initial_balance(&mut data, dec!(50)).unwrap();
        assert_eq!(data.initial_balance, dec!(50));
        assert_eq!(data.current_balance, dec!(250));

        ledger.set_initial_balance(&mut data, dec!(-20.555)).unwrap();
        assert_eq!(data.initial_balance, dec!(-20.56));
        assert_eq!(data.current_balance, dec!(179.44));
    }

    #[test]
    fn net_sums_signed_amounts() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 10);
        ledger.add_transaction(&mut data, income(dec!(10), now), now).unwrap();
        ledger.add_transaction(&mut data, expense(dec!(25), "food", now), now).unwrap();
        assert_eq!(LedgerService::net(&data).unwrap(), dec!(-15));
    }

    #[test]
    fn start_new_month_returns_to_baseline() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 10);
        ledger.set_initial_balance(&mut data, dec!(400)).unwrap();
        ledger.add_transaction(&mut data, expense(dec!(100), "food", now), now).unwrap();

        ledger.start_new_month(&mut data);
        assert!(data.transactions.is_empty());
        assert_eq!(data.current_balance, dec!(400));
    }
}

// ═══════════════════════════════════════════════════════════════════
// GoalService
// ═══════════════════════════════════════════════════════════════════

mod goals {
    use super::*;

    #[test]
    fn add_goal_clamps_negative_start_and_rounds() {
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 1, 1);
        let goal = service.add_goal(
            &mut data,
            NewGoal::new("Bike", dec!(999.999), day(2025, 12, 31)).with_current_amount(dec!(-50)),
            now,
        );
        assert_eq!(goal.current_amount, Decimal::ZERO);
        assert_eq!(goal.target_amount, dec!(1000));
        assert_eq!(goal.created_at, now);
        assert_eq!(data.goals, vec![goal]);
    }

    #[test]
    fn update_goal_clamps_current_amount() {
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let goal = service.add_goal(&mut data, NewGoal::new("Bike", dec!(100), day(2025, 12, 31)), at(2025, 1, 1));
        let update = GoalUpdate {
            current_amount: Some(dec!(-5)),
            deadline: Some(day(2026, 1, 31)),
            ..GoalUpdate::default()
        };
        assert!(service.update_goal(&mut data, &goal.id, update));
        assert_eq!(data.goals[0].current_amount, Decimal::ZERO);
        assert_eq!(data.goals[0].deadline, day(2026, 1, 31));
    }

    #[test]
    fn linked_transactions_move_goal() {
        let ledger = LedgerService::new();
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 2, 1);
        let goal = service.add_goal(&mut data, NewGoal::new("Trip", dec!(1000), day(2025, 12, 1)), now);

        ledger.add_transaction(&mut data, income(dec!(300), now).with_goal(&goal.id), now).unwrap();
        ledger
            .add_transaction(&mut data, expense(dec!(120), "food", now).with_goal(&goal.id), now)
            .unwrap();
        assert_eq!(data.goals[0].current_amount, dec!(180));

        ledger
            .add_transaction(&mut data, expense(dec!(500), "food", now).with_goal(&goal.id), now)
            .unwrap();
        assert_eq!(data.goals[0].current_amount, Decimal::ZERO);
    }

    #[test]
    fn goal_amount_saturates_at_the_decimal_range() {
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 2, 1);
        let goal = service.add_goal(&mut data, NewGoal::new("Moon", dec!(0.01), day(2025, 12, 1)), now);

        assert!(service.add_amount_to_goal(&mut data, &goal.id, Decimal::MAX));
        assert!(service.add_amount_to_goal(&mut data, &goal.id, Decimal::MAX));
        assert_eq!(data.goals[0].current_amount, Decimal::MAX);

        let progress = service.progress(&data.goals[0], now);
        assert_eq!(progress.progress_pct, Decimal::MAX);
        assert_eq!(progress.remaining, Decimal::ZERO);
        assert!(progress.achieved);
    }

    #[test]
    fn delete_goal_only_unlinks_its_own_transactions() {
        let ledger = LedgerService::new();
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 2, 1);
        let a = service.add_goal(&mut data, NewGoal::new("A", dec!(10), day(2025, 12, 1)), now);
        let b = service.add_goal(&mut data, NewGoal::new("B", dec!(10), day(2025, 12, 1)), now);
        ledger.add_transaction(&mut data, income(dec!(1), now).with_goal(&a.id), now).unwrap();
        ledger.add_transaction(&mut data, income(dec!(1), now).with_goal(&b.id), now).unwrap();

        assert!(service.delete_goal(&mut data, &a.id));

        assert_eq!(data.goals.len(), 1);
        assert_eq!(data.transactions[0].goal_id.as_deref(), Some(b.id.as_str()));
        assert_eq!(data.transactions[1].goal_id, None);
    }

    #[test]
    fn progress_midway() {
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let created = at(2025, 1, 1);
        let goal = service.add_goal(
            &mut data,
            NewGoal::new("Car", dec!(6000), day(2025, 7, 1)).with_current_amount(dec!(1500)),
            created,
        );

        // 2025-01-01 12:00 → 2025-07-01 00:00 is 180.5 days, rounded up to 181.
        let progress = service.progress(&goal, created);
        assert_eq!(progress.goal_id, goal.id);
        assert_eq!(progress.progress_pct, dec!(25));
        assert_eq!(progress.remaining, dec!(4500));
        assert_eq!(progress.days_left, 181);
        // 4500 / (181 / 30)
        assert_eq!(progress.monthly_need, dec!(745.86));
        assert!(!progress.achieved);
    }

    #[test]
    fn progress_with_less_than_a_month_left_needs_the_whole_remainder() {
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let goal = service.add_goal(&mut data, NewGoal::new("Gift", dec!(200), day(2025, 3, 20)), at(2025, 3, 1));
        let progress = service.progress(&goal, at(2025, 3, 10));
        assert_eq!(progress.days_left, 10);
        assert_eq!(progress.monthly_need, dec!(200));
    }

    #[test]
    fn achieved_goal_has_nothing_remaining() {
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let goal = service.add_goal(
            &mut data,
            NewGoal::new("Phone", dec!(800), day(2025, 6, 1)).with_current_amount(dec!(1000)),
            at(2025, 1, 1),
        );
        let progress = service.progress(&goal, at(2025, 2, 1));
        assert!(progress.achieved);
        assert_eq!(progress.remaining, Decimal::ZERO);
        assert_eq!(progress.monthly_need, Decimal::ZERO);
        assert_eq!(progress.progress_pct, dec!(125));
    }

    #[test]
    fn zero_target_reports_zero_percent() {
        let service = GoalService::new();
        let mut data = FinanceData::default();
        let goal = service.add_goal(&mut data, NewGoal::new("Odd", Decimal::ZERO, day(2025, 6, 1)), at(2025, 1, 1));
        let progress = service.progress(&goal, at(2025, 2, 1));
        assert_eq!(progress.progress_pct, Decimal::ZERO);
        assert!(progress.achieved);
    }
}

// ═══════════════════════════════════════════════════════════════════
// CategoryService
// ═══════════════════════════════════════════════════════════════════

mod categories {
    use super::*;

    #[test]
    fn add_rounds_expense_limit() {
        let service = CategoryService::new();
        let mut data = FinanceData::default();
        let c = service.add_category(
            &mut data,
            NewCategory::new("Books", "Book", "bg-books").with_limit(dec!(99.995)),
            CategoryKind::Expense,
        );
        assert_eq!(c.limit, Some(dec!(100)));
        assert_eq!(service.list(&data, CategoryKind::Expense).last(), Some(&c));
    }

    #[test]
    fn income_update_cannot_set_a_limit() {
        let service = CategoryService::new();
        let mut data = FinanceData::default();
        let update = CategoryUpdate {
            limit: Some(Some(dec!(500))),
            ..CategoryUpdate::default()
        };
        assert!(service.update_category(&mut data, "salary", update, CategoryKind::Income));
        assert_eq!(data.income_categories[0].limit, None);
    }

    #[test]
    fn delete_removes_from_selected_list_only() {
        let service = CategoryService::new();
        let mut data = FinanceData::default();
        assert!(!service.delete_category(&mut data, "salary", CategoryKind::Expense));
        assert!(service.delete_category(&mut data, "salary", CategoryKind::Income));
        assert_eq!(data.income_categories.len(), 4);
        assert_eq!(data.expense_categories.len(), 6);
    }

    #[test]
    fn update_unknown_category_reports_not_found() {
        let service = CategoryService::new();
        let mut data = FinanceData::default();
        let before = data.clone();
        assert!(!service.update_category(&mut data, "nope", CategoryUpdate::default(), CategoryKind::Expense));
        assert_eq!(data, before);
    }
}

// ═══════════════════════════════════════════════════════════════════
// StatsService
// ═══════════════════════════════════════════════════════════════════

mod stats {
    use super::*;

    fn march_data() -> FinanceData {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 15);
        ledger.set_initial_balance(&mut data, dec!(1000)).unwrap();
        for tx in [
            income(dec!(3000), at(2025, 3, 1)),
            expense(dec!(450), "food", at(2025, 3, 3)),
            expense(dec!(1200), "transport", at(2025, 3, 20)),
            expense(dec!(80), "food", Utc.with_ymd_and_hms(2025, 3, 31, 23, 59, 59).unwrap()),
            // Outside March
            income(dec!(999), at(2025, 2, 28)),
            expense(dec!(777), "food", Utc.with_ymd_and_hms(2025, 4, 1, 0, 0, 0).unwrap()),
            expense(dec!(55), "food", at(2024, 3, 10)),
        ] {
            ledger.add_transaction(&mut data, tx, now).unwrap();
        }
        data
    }

    #[test]
    fn monthly_totals_only_count_the_month() {
        let stats = StatsService::new().monthly_stats(&march_data(), day(2025, 3, 31));
        assert_eq!(stats.total_income, dec!(3000));
        assert_eq!(stats.total_expenses, dec!(1730));
        // (3000 - 1730) / 3000 * 100 = 42.333…
        assert!(stats.savings_rate > dec!(42.333) && stats.savings_rate < dec!(42.334));
        assert_eq!(round_money(stats.savings_rate), dec!(42.33));
    }

    #[test]
    fn savings_rate_is_floored_at_zero() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 15);
        ledger.add_transaction(&mut data, income(dec!(100), now), now).unwrap();
        ledger.add_transaction(&mut data, expense(dec!(250), "food", now), now).unwrap();
        let stats = StatsService::new().monthly_stats(&data, day(2025, 3, 1));
        assert_eq!(stats.savings_rate, Decimal::ZERO);
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        data.expense_categories[0].limit = Some(dec!(0.01));
        let now = at(2025, 3, 15);
        let huge = ledger
            .add_transaction(&mut data, expense(Decimal::MAX, "food", now), now)
            .unwrap();
        // Snapshots merged from other views are not re-validated
        let mut huge_income = huge.clone();
        huge_income.kind = TransactionKind::Income;
        data.transactions.extend([huge.clone(), huge_income.clone(), huge_income]);

        let service = StatsService::new();
        let stats = service.monthly_stats(&data, day(2025, 3, 1));
        assert_eq!(stats.total_income, Decimal::MAX);
        assert_eq!(stats.total_expenses, Decimal::MAX);
        assert_eq!(stats.savings_rate, Decimal::ZERO);

        assert_eq!(service.category_spending(&data, "food", day(2025, 3, 1)), Decimal::MAX);
        let budgets = service.category_budgets(&data, day(2025, 3, 1));
        assert_eq!(budgets[0].used_pct, Decimal::MAX);
        assert_eq!(budgets[0].status, BudgetStatus::OverBudget);
        assert_eq!(budgets[0].exceeded_by, Decimal::MAX - dec!(0.01));
        assert_eq!(
            service.expenses_by_category(&data, day(2025, 3, 1)),
            vec![("FOOD".to_string(), Decimal::MAX)]
        );
    }

    #[test]
    fn balance_is_all_time() {
        let data = march_data();
        let stats = StatsService::new().monthly_stats(&data, day(2025, 3, 1));
        assert_eq!(stats.balance, data.current_balance);
        // 1000 + 3000 + 999 - 450 - 1200 - 80 - 777 - 55
        assert_eq!(stats.balance, dec!(2437));
    }

    #[test]
    fn empty_month_is_all_zero() {
        let stats = StatsService::new().monthly_stats(&march_data(), day(2025, 6, 1));
        assert_eq!(stats.total_income, Decimal::ZERO);
        assert_eq!(stats.total_expenses, Decimal::ZERO);
        assert_eq!(stats.savings_rate, Decimal::ZERO);
    }

    #[test]
    fn category_spending_per_month() {
        let service = StatsService::new();
        let data = march_data();
        assert_eq!(service.category_spending(&data, "food", day(2025, 3, 1)), dec!(530));
        assert_eq!(service.category_spending(&data, "food", day(2025, 4, 1)), dec!(777));
        assert_eq!(service.category_spending(&data, "salary", day(2025, 3, 1)), Decimal::ZERO);
        assert_eq!(service.category_spending(&data, "unknown", day(2025, 3, 1)), Decimal::ZERO);
    }

    #[test]
    fn budgets_follow_expense_category_order() {
        let budgets = StatsService::new().category_budgets(&march_data(), day(2025, 3, 1));
        let ids: Vec<&str> = budgets.iter().map(|b| b.category_id.as_str()).collect();
        assert_eq!(ids, ["food", "transport", "housing", "entertainment", "health", "shopping"]);

        // food 530 / 3000
        assert_eq!(budgets[0].used_pct, dec!(17.67));
        assert_eq!(budgets[0].status, BudgetStatus::Healthy);
        // transport 1200 / 1500
        assert_eq!(budgets[1].used_pct, dec!(80));
        assert_eq!(budgets[1].status, BudgetStatus::Warning);
        assert_eq!(budgets[1].exceeded_by, Decimal::ZERO);
    }

    #[test]
    fn category_without_limit_is_always_healthy() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        data.expense_categories[0].limit = None;
        let now = at(2025, 3, 15);
        ledger.add_transaction(&mut data, expense(dec!(1_000_000), "food", now), now).unwrap();

        let budgets = StatsService::new().category_budgets(&data, day(2025, 3, 1));
        assert_eq!(budgets[0].used_pct, Decimal::ZERO);
        assert_eq!(budgets[0].status, BudgetStatus::Healthy);
        assert_eq!(budgets[0].exceeded_by, Decimal::ZERO);
    }

    #[test]
    fn expenses_grouped_by_display_name() {
        let breakdown = StatsService::new().expenses_by_category(&march_data(), day(2025, 3, 1));
        assert_eq!(
            breakdown,
            vec![("TRANSPORT".to_string(), dec!(1200)), ("FOOD".to_string(), dec!(530))]
        );
    }

    #[test]
    fn equal_totals_sort_by_name() {
        let ledger = LedgerService::new();
        let mut data = FinanceData::default();
        let now = at(2025, 3, 15);
        ledger.add_transaction(&mut data, expense(dec!(10), "health", now), now).unwrap();
        ledger.add_transaction(&mut data, expense(dec!(10), "food", now), now).unwrap();
        let breakdown = StatsService::new().expenses_by_category(&data, day(2025, 3, 1));
        assert_eq!(breakdown[0].0, "FOOD");
        assert_eq!(breakdown[1].0, "HEALTH");
    }
}
