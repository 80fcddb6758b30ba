//! Notification dispatchers that consume the scheduling engine's read side.
//! Delivery itself (Telegram, email) lives outside this crate behind the
//! [`NotificationSink`] trait; these functions format the payload and
//! isolate per-recipient failures.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::engine::{scheduled_for_month, BatchError};
use crate::ledger::{Budget, Member, Period};

/// How close to month end the planning reminder becomes due. The dispatcher
/// runs weekly, so the window must cover at least one run.
const PLANNING_WINDOW_DAYS: u32 = 7;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// External delivery seam. Implementations send one message to one member.
pub trait NotificationSink {
    fn send(&self, member: &Member, message: &str) -> Result<(), NotifyError>;
}

/// Prints messages to stdout; the CLI's default sink.
pub struct StdoutSink;

impl NotificationSink for StdoutSink {
    fn send(&self, member: &Member, message: &str) -> Result<(), NotifyError> {
        println!("--- to {} ---\n{message}\n", member.name);
        Ok(())
    }
}

#[derive(Debug, Default, Serialize)]
pub struct DispatchReport {
    pub processed: usize,
    pub succeeded: usize,
    pub errors: Vec<BatchError>,
}

/// Sends each reachable member a summary of the bills due in the next seven
/// days. A week with nothing due sends nothing.
pub fn send_weekly_bill_summary(
    budget: &Budget,
    sink: &dyn NotificationSink,
    today: NaiveDate,
) -> DispatchReport {
    let horizon = today + Duration::days(6);
    let mut due: Vec<(NaiveDate, String, i64)> = Vec::new();
    for bill in budget.active_bills() {
        for date in bill.schedule.occurrences_between(today, horizon) {
            due.push((date, bill.name.clone(), bill.amount_cents));
        }
    }
    if due.is_empty() {
        debug!(budget = %budget.name, "no bills due this week; skipping summary");
        return DispatchReport::default();
    }
    due.sort();

    let mut message = format!("Bills due this week in {}:\n", budget.name);
    for (date, name, amount_cents) in &due {
        message.push_str(&format!(
            "  {date}  {name}  {}\n",
            format_amount(*amount_cents)
        ));
    }

    dispatch_to_members(budget, sink, &message)
}

/// Reminds members to plan the coming month once the current one is almost
/// over. Runs weekly; outside the month-end window it is a no-op pass.
pub fn send_monthly_planning_reminder(
    budget: &Budget,
    sink: &dyn NotificationSink,
    today: NaiveDate,
) -> DispatchReport {
    let month_end = crate::ledger::period::last_of_month(today.year(), today.month());
    let days_left = (month_end - today).num_days() as u32;
    if days_left >= PLANNING_WINDOW_DAYS {
        return DispatchReport::default();
    }

    let next = Period::month_of(today).next();
    let (next_year, next_month) = match next {
        Period::Month { year, month } => (year, month),
        _ => return DispatchReport::default(),
    };
    let report = match scheduled_for_month(budget, next_year, next_month, today) {
        Ok(report) => report,
        Err(err) => {
            warn!(budget = %budget.name, %err, "planning reminder aggregation failed");
            return DispatchReport {
                processed: 0,
                succeeded: 0,
                errors: vec![BatchError::new(format!("budget {}", budget.name), err)],
            };
        }
    };

    let message = format!(
        "Time to plan {next_year}-{next_month:02} for {}: {} scheduled items, \
         {} expected out, {} expected in.",
        budget.name,
        report.items.len(),
        format_amount(report.totals.expenses_cents),
        format_amount(report.totals.income_cents),
    );

    dispatch_to_members(budget, sink, &message)
}

/// One send per reachable member; a failed recipient is recorded and the
/// rest still receive theirs.
fn dispatch_to_members(
    budget: &Budget,
    sink: &dyn NotificationSink,
    message: &str,
) -> DispatchReport {
    let mut report = DispatchReport::default();
    for member in &budget.members {
        if member.messaging_handle.is_none() {
            debug!(member = %member.name, "member has no messaging handle; skipping");
            continue;
        }
        report.processed += 1;
        match sink.send(member, message) {
            Ok(()) => report.succeeded += 1,
            Err(err) => {
                warn!(member = %member.name, %err, "notification delivery failed");
                report
                    .errors
                    .push(BatchError::new(format!("member {}", member.name), err));
            }
        }
    }
    info!(
        budget = %budget.name,
        processed = report.processed,
        succeeded = report.succeeded,
        "notification dispatch complete"
    );
    report
}

fn format_amount(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{
        Account, AccountKind, Category, CategoryKind, RecurringBill, Schedule,
    };
    use std::sync::Mutex;

    struct RecordingSink {
        sent: Mutex<Vec<(String, String)>>,
        fail_for: Option<String>,
    }

    impl RecordingSink {
        fn new() -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_for: None,
            }
        }

        fn failing_for(name: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                fail_for: Some(name.to_string()),
            }
        }
    }

    impl NotificationSink for RecordingSink {
        fn send(&self, member: &Member, message: &str) -> Result<(), NotifyError> {
            if self.fail_for.as_deref() == Some(member.name.as_str()) {
                return Err(NotifyError::Delivery("socket closed".into()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((member.name.clone(), message.to_string()));
            Ok(())
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn budget_with_bill_and_members() -> Budget {
        let mut budget = Budget::new("Home");
        budget.add_member(Member::with_handle("Alex", "@alex"));
        budget.add_member(Member::with_handle("Sam", "@sam"));
        budget.add_member(Member::new("Guest"));
        let account = budget.add_account(Account::new("Joint", AccountKind::Checking));
        let category =
            budget.add_category(Category::new("Housing", "home", CategoryKind::Expense));
        budget.add_bill(RecurringBill::new(
            category,
            account,
            "Rent",
            150_000,
            Schedule::monthly(5).unwrap(),
        ));
        budget
    }

    #[test]
    fn weekly_summary_reaches_every_member_with_a_handle() {
        let budget = budget_with_bill_and_members();
        let sink = RecordingSink::new();
        let report = send_weekly_bill_summary(&budget, &sink, date(2024, 3, 1));

        assert_eq!(report.processed, 2);
        assert_eq!(report.succeeded, 2);
        let sent = sink.sent.lock().unwrap();
        assert!(sent[0].1.contains("Rent"));
        assert!(sent[0].1.contains("1500.00"));
    }

    #[test]
    fn weekly_summary_skips_weeks_with_nothing_due() {
        let budget = budget_with_bill_and_members();
        let sink = RecordingSink::new();
        // March 10-16 has no occurrence of a day-5 bill.
        let report = send_weekly_bill_summary(&budget, &sink, date(2024, 3, 10));
        assert_eq!(report.processed, 0);
        assert!(sink.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn one_failed_recipient_does_not_block_the_rest() {
        let budget = budget_with_bill_and_members();
        let sink = RecordingSink::failing_for("Alex");
        let report = send_weekly_bill_summary(&budget, &sink, date(2024, 3, 1));

        assert_eq!(report.processed, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].subject.contains("Alex"));
    }

    #[test]
    fn planning_reminder_only_fires_near_month_end() {
        let budget = budget_with_bill_and_members();
        let sink = RecordingSink::new();

        let mid_month = send_monthly_planning_reminder(&budget, &sink, date(2024, 3, 10));
        assert_eq!(mid_month.processed, 0);

        let month_end = send_monthly_planning_reminder(&budget, &sink, date(2024, 3, 28));
        assert_eq!(month_end.processed, 2);
        let sent = sink.sent.lock().unwrap();
        assert!(sent[0].1.contains("2024-04"));
    }
}
