//! Update error types.

use thiserror::Error;
use xylem_core::{DocumentId, NodeKind, PermissionDenied};
use xylem_dom::DomError;
use xylem_store::{LockError, StoreError};
use xylem_txn::TransactionError;

/// Result type for update operations.
pub type MutationResult<T> = Result<T, MutationError>;

/// Errors that can occur during update execution. The first failure aborts
/// the whole operation; no partial state survives any variant here.
#[derive(Debug, Error)]
pub enum MutationError {
    #[error("selection is not a node set: {detail}")]
    SelectionType { detail: String },

    #[error("content incompatible with target: expected {expected}, got {actual}")]
    ContentType { expected: String, actual: String },

    #[error("operation requires content but the content sequence is empty")]
    EmptyContent,

    #[error("cannot replace the root element of document {0}")]
    RootReplacement(DocumentId),

    #[error("invalid selection: {detail}")]
    InvalidSelection { detail: String },

    #[error("no operation variant handles node kind {kind}")]
    UnsupportedNodeKind { kind: NodeKind },

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    PermissionDenied(#[from] PermissionDenied),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Dom(#[from] DomError),
}

impl MutationError {
    pub fn selection_type(detail: impl Into<String>) -> Self {
        Self::SelectionType {
            detail: detail.into(),
        }
    }

    pub fn content_type(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ContentType {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_selection(detail: impl Into<String>) -> Self {
        Self::InvalidSelection {
            detail: detail.into(),
        }
    }

    pub fn unsupported_kind(kind: NodeKind) -> Self {
        Self::UnsupportedNodeKind { kind }
    }
}
