use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::schedule::Schedule;

/// A template describing a periodic income inflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeSource {
    pub id: Uuid,
    /// Whose income this is, when attributed to a single member.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_id: Option<Uuid>,
    /// Destination account, when known ahead of time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<Uuid>,
    pub name: String,
    pub kind: IncomeKind,
    pub amount_cents: i64,
    pub schedule: Schedule,
    /// Confirmed automatically once the pay date has passed.
    pub is_auto_confirm: bool,
    pub is_active: bool,
    pub display_order: u32,
}

impl IncomeSource {
    pub fn new(
        name: impl Into<String>,
        kind: IncomeKind,
        amount_cents: i64,
        schedule: Schedule,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            member_id: None,
            account_id: None,
            name: name.into(),
            kind,
            amount_cents,
            schedule,
            is_auto_confirm: false,
            is_active: true,
            display_order: 0,
        }
    }

    pub fn archive(&mut self) {
        self.is_active = false;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IncomeKind {
    Salary,
    Benefit,
    Freelance,
    Rental,
    Investment,
    Other,
}

impl IncomeKind {
    /// Icon name shown on income-sourced scheduled items.
    pub fn icon(&self) -> &'static str {
        match self {
            IncomeKind::Salary => "briefcase",
            IncomeKind::Benefit => "landmark",
            IncomeKind::Freelance => "laptop",
            IncomeKind::Rental => "home",
            IncomeKind::Investment => "trending-up",
            IncomeKind::Other => "coins",
        }
    }
}
