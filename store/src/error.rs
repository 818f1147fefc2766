//! Store error types.

use thiserror::Error;
use xylem_core::DocumentId;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document {0} not found")]
    DocumentNotFound(DocumentId),

    #[error("a document is already stored at {0}")]
    PathOccupied(String),

    #[error(transparent)]
    Transaction(#[from] xylem_txn::TransactionError),
}
