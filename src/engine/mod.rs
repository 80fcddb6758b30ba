//! The recurring financial event engine: recurrence materializer, auto-clear
//! sweeper, scheduled-transactions aggregator, and the explicit confirm/undo
//! operations.

pub mod aggregator;
pub mod confirm;
pub mod materializer;
pub mod sweeper;

pub use aggregator::{
    scheduled_for_month, ReconcileAnomaly, ScheduledItem, ScheduledReport, ScheduledTotals,
};
pub use confirm::{confirm_occurrence, revert_confirmation};
pub use materializer::{materialize, MaterializeOutcome, MATERIALIZE_LOOKBACK_DAYS};
pub use sweeper::{sweep, SweepOutcome};

use std::fmt::Display;

use serde::Serialize;
use uuid::Uuid;

/// One unit's failure inside a batch pass. Batch passes collect these and
/// keep iterating; they never abort the run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchError {
    pub subject: String,
    pub message: String,
}

impl BatchError {
    pub fn new(subject: impl Into<String>, message: impl Display) -> Self {
        Self {
            subject: subject.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn for_template(
        kind: &str,
        name: &str,
        id: Uuid,
        message: impl Display,
    ) -> Self {
        Self::new(format!("{kind} {name} ({id})"), message)
    }
}
