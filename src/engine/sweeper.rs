use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::ledger::{Budget, TransactionKind};

#[derive(Debug, Default, Serialize)]
pub struct SweepOutcome {
    pub cleared_expenses: usize,
    pub cleared_income: usize,
}

/// Clears pending instances whose due date has passed, but only for
/// templates explicitly flagged for automatic confirmation. Everything else
/// stays pending until a human confirms it. Re-running selects nothing, so
/// at-least-once scheduling is safe without locking.
pub fn sweep(budget: &mut Budget, today: NaiveDate) -> SweepOutcome {
    let auto_debit: HashSet<Uuid> = budget
        .active_bills()
        .filter(|bill| bill.is_auto_debit)
        .map(|bill| bill.id)
        .collect();
    let auto_confirm: HashSet<Uuid> = budget
        .active_income_sources()
        .filter(|source| source.is_auto_confirm)
        .map(|source| source.id)
        .collect();

    // The two passes are deliberately independent: each walks its own
    // disjoint selection, so neither can interfere with the other.
    let cleared_expenses = clear_due_expenses(budget, &auto_debit, today);
    let cleared_income = clear_due_income(budget, &auto_confirm, today);

    if cleared_expenses + cleared_income > 0 {
        budget.touch();
    }
    info!(
        budget = %budget.name,
        cleared_expenses,
        cleared_income,
        "auto-clear sweep complete"
    );
    SweepOutcome {
        cleared_expenses,
        cleared_income,
    }
}

fn clear_due_expenses(budget: &mut Budget, auto_debit: &HashSet<Uuid>, today: NaiveDate) -> usize {
    let mut cleared = 0;
    for txn in budget.transactions.iter_mut() {
        // The pending guard doubles as the conditional update: a row a user
        // already confirmed (or reverted) concurrently is never re-touched.
        if !txn.is_pending() || txn.kind != TransactionKind::Expense || txn.date > today {
            continue;
        }
        let eligible = txn
            .recurring_bill_id
            .map(|id| auto_debit.contains(&id))
            .unwrap_or(false);
        if eligible {
            txn.mark_cleared();
            cleared += 1;
        }
    }
    cleared
}

fn clear_due_income(budget: &mut Budget, auto_confirm: &HashSet<Uuid>, today: NaiveDate) -> usize {
    let mut cleared = 0;
    for txn in budget.transactions.iter_mut() {
        if !txn.is_pending() || txn.kind != TransactionKind::Income || txn.date > today {
            continue;
        }
        let eligible = txn
            .income_source_id
            .map(|id| auto_confirm.contains(&id))
            .unwrap_or(false);
        if eligible {
            txn.mark_cleared();
            cleared += 1;
        }
    }
    cleared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::materialize;
    use crate::ledger::{
        Account, AccountKind, Category, CategoryKind, IncomeKind, IncomeSource, RecurringBill,
        Schedule, TransactionStatus,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget_with_two_bills() -> Budget {
        let mut budget = Budget::new("Home");
        let account = budget.add_account(Account::new("Joint", AccountKind::Checking));
        let category =
            budget.add_category(Category::new("Housing", "home", CategoryKind::Expense));

        let mut rent = RecurringBill::new(
            category,
            account,
            "Rent",
            150_000,
            Schedule::monthly(5).unwrap(),
        );
        rent.is_auto_debit = true;
        budget.add_bill(rent);

        let water = RecurringBill::new(
            category,
            account,
            "Water",
            4_500,
            Schedule::monthly(5).unwrap(),
        );
        budget.add_bill(water);
        budget
    }

    #[test]
    fn only_auto_debit_instances_are_cleared() {
        let mut budget = budget_with_two_bills();
        materialize(&mut budget, date(2024, 3, 5));

        let outcome = sweep(&mut budget, date(2024, 3, 6));
        assert_eq!(outcome.cleared_expenses, 1);
        assert_eq!(outcome.cleared_income, 0);

        let statuses: Vec<_> = budget
            .transactions
            .iter()
            .map(|txn| (txn.description.clone(), txn.status))
            .collect();
        assert!(statuses.contains(&("Rent".into(), TransactionStatus::Cleared)));
        assert!(statuses.contains(&("Water".into(), TransactionStatus::Pending)));
    }

    #[test]
    fn sweeping_twice_clears_nothing_more() {
        let mut budget = budget_with_two_bills();
        materialize(&mut budget, date(2024, 3, 5));

        let first = sweep(&mut budget, date(2024, 3, 6));
        let second = sweep(&mut budget, date(2024, 3, 6));
        assert_eq!(first.cleared_expenses, 1);
        assert_eq!(second.cleared_expenses, 0);
        assert_eq!(second.cleared_income, 0);
    }

    #[test]
    fn due_today_is_cleared_but_future_is_not() {
        let mut budget = budget_with_two_bills();
        materialize(&mut budget, date(2024, 3, 5));

        // Sweep the day before the due date: nothing is eligible yet.
        assert_eq!(sweep(&mut budget, date(2024, 3, 4)).cleared_expenses, 0);
        // On the due date itself the instance clears.
        assert_eq!(sweep(&mut budget, date(2024, 3, 5)).cleared_expenses, 1);
    }

    #[test]
    fn auto_confirm_income_clears_independently() {
        let mut budget = budget_with_two_bills();
        let mut salary = IncomeSource::new(
            "Salary",
            IncomeKind::Salary,
            250_000,
            Schedule::monthly(25).unwrap(),
        );
        salary.is_auto_confirm = true;
        salary.account_id = Some(budget.accounts[0].id);
        budget.add_income_source(salary);

        materialize(&mut budget, date(2024, 3, 5));
        materialize(&mut budget, date(2024, 3, 25));
        let outcome = sweep(&mut budget, date(2024, 3, 26));
        assert_eq!(outcome.cleared_income, 1);
        // Rent (due the 5th, auto-debit) was materialized earlier in the
        // month and clears in the same sweep.
        assert_eq!(outcome.cleared_expenses, 1);
    }

    #[test]
    fn sweep_with_no_pending_rows_is_a_no_op() {
        let mut budget = budget_with_two_bills();
        let outcome = sweep(&mut budget, date(2024, 3, 6));
        assert_eq!(outcome.cleared_expenses + outcome.cleared_income, 0);
    }
}
