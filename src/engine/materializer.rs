use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::BudgetError;
use crate::ledger::{Budget, IncomeSource, RecurringBill, TemplateRef, Transaction};

use super::BatchError;

/// How far back a run looks for occurrences that were never materialized,
/// e.g. because the scheduler was down for a few days. Older occurrences are
/// not backfilled; the aggregator still reports them as unpaid, and
/// confirming one creates its row on demand.
pub const MATERIALIZE_LOOKBACK_DAYS: i64 = 7;

#[derive(Debug, Default, Serialize)]
pub struct MaterializeOutcome {
    pub created: usize,
    pub errors: Vec<BatchError>,
}

/// Ensures every active template with an occurrence due on or before `today`
/// has a matching transaction row. Existing (template, date) pairs are
/// skipped, so re-running for the same day creates nothing new, and a failed
/// template never aborts the rest of the pass.
pub fn materialize(budget: &mut Budget, today: NaiveDate) -> MaterializeOutcome {
    let window_start = today - Duration::days(MATERIALIZE_LOOKBACK_DAYS);
    let mut outcome = MaterializeOutcome::default();

    // Creation mutates the ledger, so snapshot the template lists first.
    let bills: Vec<RecurringBill> = budget.active_bills().cloned().collect();
    for bill in &bills {
        match materialize_bill(budget, bill, window_start, today) {
            Ok(created) => outcome.created += created,
            Err(err) => {
                warn!(bill = %bill.name, %err, "skipping bill");
                outcome
                    .errors
                    .push(BatchError::for_template("bill", &bill.name, bill.id, err));
            }
        }
    }

    let sources: Vec<IncomeSource> = budget.active_income_sources().cloned().collect();
    for source in &sources {
        match materialize_income(budget, source, window_start, today) {
            Ok(created) => outcome.created += created,
            Err(err) => {
                warn!(source = %source.name, %err, "skipping income source");
                outcome.errors.push(BatchError::for_template(
                    "income source",
                    &source.name,
                    source.id,
                    err,
                ));
            }
        }
    }

    info!(
        budget = %budget.name,
        created = outcome.created,
        errors = outcome.errors.len(),
        "materializer pass complete"
    );
    outcome
}

fn materialize_bill(
    budget: &mut Budget,
    bill: &RecurringBill,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<usize, BudgetError> {
    if budget.account(bill.account_id).is_none() {
        return Err(BudgetError::InvalidReference(format!(
            "unknown account {}",
            bill.account_id
        )));
    }
    if budget.category(bill.category_id).is_none() {
        return Err(BudgetError::InvalidReference(format!(
            "unknown category {}",
            bill.category_id
        )));
    }

    let mut created = 0;
    for date in bill.schedule.occurrences_between(from, to) {
        if budget.has_instance(TemplateRef::Bill(bill.id), date) {
            continue;
        }
        debug!(bill = %bill.name, %date, "materializing bill occurrence");
        budget.add_transaction(Transaction::from_bill(bill, date));
        created += 1;
    }
    Ok(created)
}

fn materialize_income(
    budget: &mut Budget,
    source: &IncomeSource,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<usize, BudgetError> {
    if let Some(account_id) = source.account_id {
        if budget.account(account_id).is_none() {
            return Err(BudgetError::InvalidReference(format!(
                "unknown account {account_id}"
            )));
        }
    }
    if let Some(member_id) = source.member_id {
        if budget.member(member_id).is_none() {
            return Err(BudgetError::InvalidReference(format!(
                "unknown member {member_id}"
            )));
        }
    }

    let mut created = 0;
    for date in source.schedule.occurrences_between(from, to) {
        if budget.has_instance(TemplateRef::Income(source.id), date) {
            continue;
        }
        debug!(source = %source.name, %date, "materializing income occurrence");
        budget.add_transaction(Transaction::from_income_source(source, date));
        created += 1;
    }
    Ok(created)
}
