use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::Schedule;

/// A template describing a periodic expense obligation. Templates own their
/// scheduling rule and nothing else; the materialized transactions own the
/// financial facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringBill {
    pub id: Uuid,
    pub category_id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub amount_cents: i64,
    pub schedule: Schedule,
    /// Paid automatically by the bank; eligible for the auto-clear sweep.
    pub is_auto_debit: bool,
    /// Amount varies per occurrence; instances carry the template amount as
    /// a placeholder until adjusted.
    pub is_variable: bool,
    pub is_active: bool,
    pub display_order: u32,
}

impl RecurringBill {
    pub fn new(
        category_id: Uuid,
        account_id: Uuid,
        name: impl Into<String>,
        amount_cents: i64,
        schedule: Schedule,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category_id,
            account_id,
            name: name.into(),
            amount_cents,
            schedule,
            is_auto_debit: false,
            is_variable: false,
            is_active: true,
            display_order: 0,
        }
    }

    pub fn archive(&mut self) {
        self.is_active = false;
    }
}
