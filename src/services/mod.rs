//! Validated CRUD over budget records. Template configuration errors are
//! rejected here, at create/update time, and never reach the scheduling
//! engine.

pub mod bill_service;
pub mod income_service;
pub mod transaction_service;

pub use bill_service::{BillDraft, BillService};
pub use income_service::{IncomeDraft, IncomeService};
pub use transaction_service::{ManualTransactionDraft, TransactionService};

use crate::errors::BudgetError;
use crate::ledger::ScheduleError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error("{0}")]
    Invalid(String),
}

impl From<ScheduleError> for ServiceError {
    fn from(err: ScheduleError) -> Self {
        ServiceError::Invalid(err.to_string())
    }
}
