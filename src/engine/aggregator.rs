use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use crate::errors::BudgetError;
use crate::ledger::{
    Budget, Period, TemplateRef, Transaction, TransactionKind, TransactionStatus,
};

const FALLBACK_BILL_ICON: &str = "receipt";

/// One expected occurrence of a recurring template inside the requested
/// month, reconciled against whatever the ledger actually recorded.
/// Computed fresh on every call, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledItem {
    pub template: TemplateRef,
    pub name: String,
    pub icon: String,
    pub kind: TransactionKind,
    pub due_date: NaiveDate,
    /// Recorded amount when a matching transaction exists, planned amount
    /// otherwise.
    pub amount_cents: i64,
    pub planned_amount_cents: i64,
    pub is_paid: bool,
    /// Due strictly before the caller's "today" and still unpaid.
    pub is_overdue: bool,
    pub transaction_id: Option<Uuid>,
    pub has_duplicates: bool,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct ScheduledTotals {
    pub expenses_cents: i64,
    pub income_cents: i64,
    pub paid_expenses_cents: i64,
    pub paid_income_cents: i64,
}

/// More than one ledger row claimed the same occurrence. The most recently
/// created row decides paid state; the rest are reported here instead of
/// being silently summed.
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileAnomaly {
    pub template: TemplateRef,
    pub due_date: NaiveDate,
    pub transaction_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct ScheduledReport {
    pub year: i32,
    pub month: u32,
    pub items: Vec<ScheduledItem>,
    pub totals: ScheduledTotals,
    pub anomalies: Vec<ReconcileAnomaly>,
}

struct Reconciliation<'a> {
    chosen: Option<&'a Transaction>,
    duplicates: Vec<Uuid>,
}

/// Reconciles every active template against the ledger for one month:
/// what was supposed to happen versus what was recorded. Read-only; data
/// anomalies degrade to flags rather than failing the request.
pub fn scheduled_for_month(
    budget: &Budget,
    year: i32,
    month: u32,
    today: NaiveDate,
) -> Result<ScheduledReport, BudgetError> {
    let period =
        Period::month(year, month).map_err(|err| BudgetError::InvalidInput(err.to_string()))?;
    let range = period.date_range();
    let in_range = budget.transactions_in(&range);

    let mut keyed: Vec<(u32, ScheduledItem)> = Vec::new();
    let mut anomalies = Vec::new();

    for bill in budget.active_bills() {
        let occurrences = bill.schedule.due_in_month(year, month);
        let match_any_date = occurrences.len() == 1;
        let icon = budget
            .category(bill.category_id)
            .map(|category| category.icon.clone())
            .unwrap_or_else(|| FALLBACK_BILL_ICON.to_string());
        for due_date in occurrences {
            let template = TemplateRef::Bill(bill.id);
            let matched = reconcile(&in_range, template, due_date, match_any_date);
            push_item(
                &mut keyed,
                &mut anomalies,
                ItemSpec {
                    template,
                    name: bill.name.clone(),
                    icon: icon.clone(),
                    kind: TransactionKind::Expense,
                    due_date,
                    planned_amount_cents: bill.amount_cents,
                    display_order: bill.display_order,
                },
                matched,
                today,
            );
        }
    }

    for source in budget.active_income_sources() {
        let occurrences = source.schedule.due_in_month(year, month);
        let match_any_date = occurrences.len() == 1;
        for due_date in occurrences {
            let template = TemplateRef::Income(source.id);
            let matched = reconcile(&in_range, template, due_date, match_any_date);
            push_item(
                &mut keyed,
                &mut anomalies,
                ItemSpec {
                    template,
                    name: source.name.clone(),
                    icon: source.kind.icon().to_string(),
                    kind: TransactionKind::Income,
                    due_date,
                    planned_amount_cents: source.amount_cents,
                    display_order: source.display_order,
                },
                matched,
                today,
            );
        }
    }

    keyed.sort_by(|(order_a, a), (order_b, b)| {
        (a.due_date, *order_a, &a.name).cmp(&(b.due_date, *order_b, &b.name))
    });
    let items: Vec<ScheduledItem> = keyed.into_iter().map(|(_, item)| item).collect();

    let mut totals = ScheduledTotals::default();
    for item in &items {
        match item.kind {
            TransactionKind::Expense => {
                totals.expenses_cents += item.planned_amount_cents;
                if item.is_paid {
                    totals.paid_expenses_cents += item.amount_cents;
                }
            }
            TransactionKind::Income => {
                totals.income_cents += item.planned_amount_cents;
                if item.is_paid {
                    totals.paid_income_cents += item.amount_cents;
                }
            }
            TransactionKind::Transfer => {}
        }
    }

    Ok(ScheduledReport {
        year,
        month,
        items,
        totals,
        anomalies,
    })
}

struct ItemSpec {
    template: TemplateRef,
    name: String,
    icon: String,
    kind: TransactionKind,
    due_date: NaiveDate,
    planned_amount_cents: i64,
    display_order: u32,
}

/// Finds the ledger rows answering for one occurrence. Templates with a
/// single occurrence in the month match any of their instances in range
/// (users sometimes settle a bill a few days off-schedule); templates with
/// several occurrences match by exact date.
fn reconcile<'a>(
    in_range: &[&'a Transaction],
    template: TemplateRef,
    due_date: NaiveDate,
    match_any_date: bool,
) -> Reconciliation<'a> {
    let mut matches: Vec<&'a Transaction> = in_range
        .iter()
        .copied()
        .filter(|txn| {
            txn.template() == Some(template) && (match_any_date || txn.date == due_date)
        })
        .collect();
    matches.sort_by_key(|txn| txn.created_at);

    let chosen = matches.last().copied();
    let duplicates = if matches.len() > 1 {
        matches.iter().map(|txn| txn.id).collect()
    } else {
        Vec::new()
    };
    Reconciliation { chosen, duplicates }
}

fn push_item(
    keyed: &mut Vec<(u32, ScheduledItem)>,
    anomalies: &mut Vec<ReconcileAnomaly>,
    spec: ItemSpec,
    matched: Reconciliation<'_>,
    today: NaiveDate,
) {
    let is_paid = matched
        .chosen
        .map(|txn| txn.status == TransactionStatus::Cleared)
        .unwrap_or(false);
    let amount_cents = matched
        .chosen
        .map(|txn| txn.amount_cents)
        .unwrap_or(spec.planned_amount_cents);

    let has_duplicates = !matched.duplicates.is_empty();
    if has_duplicates {
        anomalies.push(ReconcileAnomaly {
            template: spec.template,
            due_date: spec.due_date,
            transaction_ids: matched.duplicates,
        });
    }

    keyed.push((
        spec.display_order,
        ScheduledItem {
            template: spec.template,
            name: spec.name,
            icon: spec.icon,
            kind: spec.kind,
            due_date: spec.due_date,
            amount_cents,
            planned_amount_cents: spec.planned_amount_cents,
            is_paid,
            is_overdue: spec.due_date < today && !is_paid,
            transaction_id: matched.chosen.map(|txn| txn.id),
            has_duplicates,
        },
    ));
}
