pub mod category_service;
pub mod recurring_service;
pub mod summary_service;
pub mod transaction_service;

pub use category_service::CategoryService;
pub use recurring_service::RecurringService;
pub use summary_service::SummaryService;
pub use transaction_service::TransactionService;

use crate::errors::LedgerError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("{0}")]
    Invalid(String),
}
