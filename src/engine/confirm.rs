use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::errors::{BudgetError, Result};
use crate::ledger::{Budget, TemplateRef, Transaction, TransactionStatus};

/// Confirms one occurrence of a recurring template: clears the pending
/// instance when one exists, otherwise creates the instance and clears it in
/// the same step. An already-cleared instance is left untouched. These are
/// single-item user actions, so unlike the batch passes they propagate
/// failures directly.
pub fn confirm_occurrence(
    budget: &mut Budget,
    template: TemplateRef,
    date: NaiveDate,
    amount_cents: Option<i64>,
) -> Result<Uuid> {
    let existing = budget
        .transactions
        .iter()
        .find(|txn| txn.template() == Some(template) && txn.date == date)
        .map(|txn| (txn.id, txn.status));

    if let Some((id, status)) = existing {
        if status == TransactionStatus::Cleared {
            return Ok(id);
        }
        let txn = budget
            .transaction_mut(id)
            .ok_or(BudgetError::TransactionNotFound(id))?;
        if let Some(amount) = amount_cents {
            txn.amount_cents = amount;
            txn.is_estimate = false;
        }
        txn.mark_cleared();
        budget.touch();
        info!(transaction = %id, %date, "confirmed pending instance");
        return Ok(id);
    }

    let mut instance = instance_from_template(budget, template, date)?;
    if let Some(amount) = amount_cents {
        instance.amount_cents = amount;
        instance.is_estimate = false;
    }
    instance.mark_cleared();
    let id = budget.add_transaction(instance);
    info!(transaction = %id, %date, "created and confirmed instance");
    Ok(id)
}

/// Reverts a cleared, template-linked transaction back to pending. This is
/// deliberately a distinct operation from deletion: undoing a confirmation
/// keeps the scheduled occurrence on the books, while deletion is reserved
/// for rows that should not exist at all.
pub fn revert_confirmation(budget: &mut Budget, transaction_id: Uuid) -> Result<()> {
    let txn = budget
        .transaction_mut(transaction_id)
        .ok_or(BudgetError::TransactionNotFound(transaction_id))?;
    if txn.template().is_none() {
        return Err(BudgetError::InvalidInput(
            "only transactions linked to a recurring template can be reverted".into(),
        ));
    }
    if txn.status != TransactionStatus::Cleared {
        return Err(BudgetError::InvalidInput(
            "transaction is not cleared".into(),
        ));
    }
    txn.mark_pending();
    budget.touch();
    info!(transaction = %transaction_id, "reverted confirmation");
    Ok(())
}

fn instance_from_template(
    budget: &Budget,
    template: TemplateRef,
    date: NaiveDate,
) -> Result<Transaction> {
    match template {
        TemplateRef::Bill(id) => {
            let bill = budget.bill(id).ok_or_else(|| {
                BudgetError::InvalidReference(format!("unknown recurring bill {id}"))
            })?;
            Ok(Transaction::from_bill(bill, date))
        }
        TemplateRef::Income(id) => {
            let source = budget.income_source(id).ok_or_else(|| {
                BudgetError::InvalidReference(format!("unknown income source {id}"))
            })?;
            Ok(Transaction::from_income_source(source, date))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::materialize;
    use crate::ledger::{
        Account, AccountKind, Category, CategoryKind, RecurringBill, Schedule, TransactionKind,
    };
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget_with_power_bill() -> (Budget, Uuid) {
        let mut budget = Budget::new("Home");
        let account = budget.add_account(Account::new("Joint", AccountKind::Checking));
        let category =
            budget.add_category(Category::new("Utilities", "zap", CategoryKind::Expense));
        let mut bill = RecurringBill::new(
            category,
            account,
            "Power",
            9_000,
            Schedule::monthly(12).unwrap(),
        );
        bill.is_variable = true;
        let id = budget.add_bill(bill);
        (budget, id)
    }

    #[test]
    fn confirming_a_pending_instance_clears_it_and_fixes_the_amount() {
        let (mut budget, bill_id) = budget_with_power_bill();
        materialize(&mut budget, date(2024, 3, 12));

        let id = confirm_occurrence(
            &mut budget,
            TemplateRef::Bill(bill_id),
            date(2024, 3, 12),
            Some(9_350),
        )
        .unwrap();
        let txn = budget.transaction(id).unwrap();
        assert_eq!(txn.status, TransactionStatus::Cleared);
        assert_eq!(txn.amount_cents, 9_350);
        assert!(!txn.is_estimate);
    }

    #[test]
    fn confirming_without_a_row_creates_then_clears() {
        let (mut budget, bill_id) = budget_with_power_bill();
        let id = confirm_occurrence(
            &mut budget,
            TemplateRef::Bill(bill_id),
            date(2024, 3, 12),
            None,
        )
        .unwrap();
        let txn = budget.transaction(id).unwrap();
        assert_eq!(txn.status, TransactionStatus::Cleared);
        assert_eq!(txn.recurring_bill_id, Some(bill_id));
        assert_eq!(budget.transactions.len(), 1);
    }

    #[test]
    fn confirming_twice_is_idempotent() {
        let (mut budget, bill_id) = budget_with_power_bill();
        let first = confirm_occurrence(
            &mut budget,
            TemplateRef::Bill(bill_id),
            date(2024, 3, 12),
            None,
        )
        .unwrap();
        let second = confirm_occurrence(
            &mut budget,
            TemplateRef::Bill(bill_id),
            date(2024, 3, 12),
            Some(1),
        )
        .unwrap();
        assert_eq!(first, second);
        // The follow-up confirm does not rewrite the cleared row.
        assert_eq!(budget.transaction(first).unwrap().amount_cents, 9_000);
        assert_eq!(budget.transactions.len(), 1);
    }

    #[test]
    fn confirm_rejects_unknown_template() {
        let (mut budget, _) = budget_with_power_bill();
        let err = confirm_occurrence(
            &mut budget,
            TemplateRef::Bill(Uuid::new_v4()),
            date(2024, 3, 12),
            None,
        )
        .expect_err("unknown template must fail");
        assert!(matches!(err, BudgetError::InvalidReference(_)));
    }

    #[test]
    fn revert_returns_a_cleared_instance_to_pending() {
        let (mut budget, bill_id) = budget_with_power_bill();
        let id = confirm_occurrence(
            &mut budget,
            TemplateRef::Bill(bill_id),
            date(2024, 3, 12),
            None,
        )
        .unwrap();
        revert_confirmation(&mut budget, id).unwrap();
        assert_eq!(
            budget.transaction(id).unwrap().status,
            TransactionStatus::Pending
        );
    }

    #[test]
    fn revert_rejects_manual_transactions() {
        let (mut budget, _) = budget_with_power_bill();
        let account = budget.accounts[0].id;
        let id = budget.add_transaction(Transaction::manual(
            account,
            TransactionKind::Expense,
            2_000,
            date(2024, 3, 2),
            "Coffee",
        ));
        let err = revert_confirmation(&mut budget, id).expect_err("manual rows cannot revert");
        assert!(matches!(err, BudgetError::InvalidInput(_)));
    }

    #[test]
    fn revert_rejects_pending_rows() {
        let (mut budget, bill_id) = budget_with_power_bill();
        materialize(&mut budget, date(2024, 3, 12));
        let id = budget
            .instances_of(TemplateRef::Bill(bill_id))
            .first()
            .map(|txn| txn.id)
            .unwrap();
        assert!(revert_confirmation(&mut budget, id).is_err());
    }
}
