use thiserror::Error;

use crate::ledger::RecordId;

/// Error type that captures common ledger failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Persistence error: {0}")]
    Persistence(String),
    #[error("Recurring rule not found: {0}")]
    RuleNotFound(RecordId),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(RecordId),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Validation failed: {0}")]
    Validation(String),
}

impl LedgerError {
    /// Returns `true` for failures that happened while writing to storage.
    pub fn is_write_failure(&self) -> bool {
        matches!(self, LedgerError::Io(_) | LedgerError::Persistence(_))
    }
}
