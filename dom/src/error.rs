//! DOM error types.

use thiserror::Error;
use xylem_core::{NodeAddr, NodeKind};

/// Result type for structural edits.
pub type DomResult<T> = Result<T, DomError>;

/// Errors raised by structural edits on a document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("no node at address {0}")]
    NodeNotFound(NodeAddr),

    #[error("node at {addr} is a {actual}, expected {expected}")]
    KindMismatch {
        addr: NodeAddr,
        expected: NodeKind,
        actual: NodeKind,
    },

    #[error("document has no root element")]
    NoRoot,
}

impl DomError {
    pub fn kind_mismatch(addr: NodeAddr, expected: NodeKind, actual: NodeKind) -> Self {
        Self::KindMismatch {
            addr,
            expected,
            actual,
        }
    }
}
