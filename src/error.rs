use crate::domain::expense::ExpenseId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Expense {0} not found")]
    NotFoundError(ExpenseId),
    #[error("Expense {0} already exists")]
    DuplicateError(ExpenseId),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl SplitError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }
}

pub type Result<T> = std::result::Result<T, SplitError>;
