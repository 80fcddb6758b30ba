//! Cron-invoked job passes. Each run walks every stored budget, isolates
//! per-budget failures, and returns a summary instead of aborting. The
//! external scheduler re-invokes on transient failure; the engine's
//! idempotency makes at-least-once delivery safe.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{info, warn};

use crate::engine::{materialize, sweep, BatchError};
use crate::notify::{
    send_monthly_planning_reminder, send_weekly_bill_summary, DispatchReport, NotificationSink,
};
use crate::storage::StorageBackend;

#[derive(Debug, Default, Serialize)]
pub struct MaterializerRun {
    pub budgets_processed: usize,
    pub budgets_succeeded: usize,
    pub created: usize,
    pub errors: Vec<BatchError>,
}

#[derive(Debug, Default, Serialize)]
pub struct SweeperRun {
    pub budgets_processed: usize,
    pub budgets_succeeded: usize,
    pub cleared_expenses: usize,
    pub cleared_income: usize,
    pub errors: Vec<BatchError>,
}

#[derive(Debug, Default, Serialize)]
pub struct NotifyRun {
    pub budgets_processed: usize,
    pub recipients_processed: usize,
    pub recipients_succeeded: usize,
    pub errors: Vec<BatchError>,
}

/// Daily pass: materialize newly due occurrences in every stored budget.
pub fn run_materializer(storage: &dyn StorageBackend, today: NaiveDate) -> MaterializerRun {
    let mut run = MaterializerRun::default();
    let names = match storage.list() {
        Ok(names) => names,
        Err(err) => {
            run.errors.push(BatchError::new("storage", err));
            return run;
        }
    };

    for name in names {
        run.budgets_processed += 1;
        let result = (|| {
            let mut budget = storage.load(&name)?;
            let outcome = materialize(&mut budget, today);
            if outcome.created > 0 {
                storage.save(&budget)?;
            }
            Ok::<_, crate::errors::BudgetError>(outcome)
        })();
        match result {
            Ok(outcome) => {
                run.budgets_succeeded += 1;
                run.created += outcome.created;
                run.errors.extend(outcome.errors);
            }
            Err(err) => {
                warn!(budget = %name, %err, "materializer failed for budget");
                run.errors
                    .push(BatchError::new(format!("budget {name}"), err));
            }
        }
    }

    info!(
        budgets = run.budgets_processed,
        created = run.created,
        errors = run.errors.len(),
        "materializer run complete"
    );
    run
}

/// Daily pass: auto-clear due instances in every stored budget. Running
/// before the materializer in a cycle is harmless; the sweep simply selects
/// nothing.
pub fn run_sweeper(storage: &dyn StorageBackend, today: NaiveDate) -> SweeperRun {
    let mut run = SweeperRun::default();
    let names = match storage.list() {
        Ok(names) => names,
        Err(err) => {
            run.errors.push(BatchError::new("storage", err));
            return run;
        }
    };

    for name in names {
        run.budgets_processed += 1;
        let result = (|| {
            let mut budget = storage.load(&name)?;
            let outcome = sweep(&mut budget, today);
            if outcome.cleared_expenses + outcome.cleared_income > 0 {
                storage.save(&budget)?;
            }
            Ok::<_, crate::errors::BudgetError>(outcome)
        })();
        match result {
            Ok(outcome) => {
                run.budgets_succeeded += 1;
                run.cleared_expenses += outcome.cleared_expenses;
                run.cleared_income += outcome.cleared_income;
            }
            Err(err) => {
                warn!(budget = %name, %err, "sweeper failed for budget");
                run.errors
                    .push(BatchError::new(format!("budget {name}"), err));
            }
        }
    }

    info!(
        budgets = run.budgets_processed,
        cleared_expenses = run.cleared_expenses,
        cleared_income = run.cleared_income,
        errors = run.errors.len(),
        "sweeper run complete"
    );
    run
}

/// Weekly pass: bill summaries for the coming week.
pub fn run_weekly_summaries(
    storage: &dyn StorageBackend,
    sink: &dyn NotificationSink,
    today: NaiveDate,
) -> NotifyRun {
    run_dispatch(storage, |budget| send_weekly_bill_summary(budget, sink, today))
}

/// Weekly pass, conditional on month end: planning reminders for next month.
pub fn run_planning_reminders(
    storage: &dyn StorageBackend,
    sink: &dyn NotificationSink,
    today: NaiveDate,
) -> NotifyRun {
    run_dispatch(storage, |budget| {
        send_monthly_planning_reminder(budget, sink, today)
    })
}

fn run_dispatch<F>(storage: &dyn StorageBackend, dispatch: F) -> NotifyRun
where
    F: Fn(&crate::ledger::Budget) -> DispatchReport,
{
    let mut run = NotifyRun::default();
    let names = match storage.list() {
        Ok(names) => names,
        Err(err) => {
            run.errors.push(BatchError::new("storage", err));
            return run;
        }
    };

    for name in names {
        run.budgets_processed += 1;
        match storage.load(&name) {
            Ok(budget) => {
                let report = dispatch(&budget);
                run.recipients_processed += report.processed;
                run.recipients_succeeded += report.succeeded;
                run.errors.extend(report.errors);
            }
            Err(err) => {
                warn!(budget = %name, %err, "could not load budget for dispatch");
                run.errors
                    .push(BatchError::new(format!("budget {name}"), err));
            }
        }
    }
    run
}
