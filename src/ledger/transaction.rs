use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::income_source::IncomeSource;
use super::recurring_bill::RecurringBill;

/// The concrete ledger entry, and the only mutable financial fact. Template
/// back-references exist purely so reconciliation can find instances; the
/// transaction owns the recorded amount and date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    /// Absent only on income instances whose source has no destination
    /// account configured yet.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount_cents: i64,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_source_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_bill_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_account_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<Uuid>,
    /// Set on instances of variable-amount bills until a human adjusts them.
    #[serde(default)]
    pub is_estimate: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// A manually entered transaction. Manual entries are recorded facts and
    /// start life cleared.
    pub fn manual(
        account_id: Uuid,
        kind: TransactionKind,
        amount_cents: i64,
        date: NaiveDate,
        description: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id: Some(account_id),
            kind,
            status: TransactionStatus::Cleared,
            amount_cents,
            date,
            description: description.into(),
            category_id: None,
            income_source_id: None,
            recurring_bill_id: None,
            to_account_id: None,
            member_id: None,
            is_estimate: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// A pending expense instance materialized from a recurring bill.
    pub fn from_bill(bill: &RecurringBill, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id: Some(bill.account_id),
            kind: TransactionKind::Expense,
            status: TransactionStatus::Pending,
            amount_cents: bill.amount_cents,
            date,
            description: bill.name.clone(),
            category_id: Some(bill.category_id),
            income_source_id: None,
            recurring_bill_id: Some(bill.id),
            to_account_id: None,
            member_id: None,
            is_estimate: bill.is_variable,
            created_at: now,
            updated_at: now,
        }
    }

    /// A pending income instance materialized from an income source.
    pub fn from_income_source(source: &IncomeSource, date: NaiveDate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            account_id: source.account_id,
            kind: TransactionKind::Income,
            status: TransactionStatus::Pending,
            amount_cents: source.amount_cents,
            date,
            description: source.name.clone(),
            category_id: None,
            income_source_id: Some(source.id),
            recurring_bill_id: None,
            to_account_id: None,
            member_id: source.member_id,
            is_estimate: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The template this instance was materialized from, when any.
    pub fn template(&self) -> Option<TemplateRef> {
        match (self.recurring_bill_id, self.income_source_id) {
            (Some(bill), _) => Some(TemplateRef::Bill(bill)),
            (None, Some(source)) => Some(TemplateRef::Income(source)),
            (None, None) => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    pub fn mark_cleared(&mut self) {
        self.status = TransactionStatus::Cleared;
        self.updated_at = Utc::now();
    }

    pub fn mark_pending(&mut self) {
        self.status = TransactionStatus::Pending;
        self.updated_at = Utc::now();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

/// Pending entries are planned but unconfirmed; cleared entries are settled
/// facts, whether confirmed by a human or by the auto-clear sweep.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Cleared,
}

/// Identifies the recurring template behind a materialized instance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TemplateRef {
    Bill(Uuid),
    Income(Uuid),
}
