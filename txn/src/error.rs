//! Transaction error types.

use thiserror::Error;

use crate::journal::JournalError;

/// Result type for transaction operations.
pub type TxnResult<T> = Result<T, TransactionError>;

/// Transaction errors.
#[derive(Debug, Error)]
pub enum TransactionError {
    /// The handle was already committed or aborted.
    #[error("transaction {0} is no longer active")]
    NotActive(u64),

    /// The journal refused a record; the transaction cannot be made durable.
    #[error("transaction failure: {0}")]
    Journal(#[from] JournalError),
}
