use uuid::Uuid;

use thiserror::Error;

/// Unified error type for the domain, engine, and storage layers.
#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("budget not found: {0}")]
    BudgetNotFound(String),
    #[error("transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("persistence error: {0}")]
    Storage(String),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, BudgetError>;

impl From<std::io::Error> for BudgetError {
    fn from(err: std::io::Error) -> Self {
        BudgetError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for BudgetError {
    fn from(err: serde_json::Error) -> Self {
        BudgetError::Storage(err.to_string())
    }
}
