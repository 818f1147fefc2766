//! Xylem Mutation
//!
//! Execute structural update operations (REPLACE/INSERT/DELETE/RENAME/
//! UPDATE VALUE) against stored documents.
//!
//! Responsibilities:
//! - Drive the shared update protocol: select, validate content, lock,
//!   authorize, transact, apply per node, audit fragmentation, commit,
//!   notify, unlock
//! - Capture content as detached deep copies before any edit
//! - Dispatch each operation variant on the target node's kind
//! - Guarantee cleanup: locks released and index listeners detached on
//!   every exit path, error paths included
//!
//! # Module Structure
//!
//! - `executor` - UpdateExecutor driving the protocol end to end
//! - `ops/` - Individual operation implementations (replace, insert,
//!   delete, rename, update_value)
//! - `source` - Selector and ContentSource traits (the query-evaluator seam)
//! - `validation` - Content capture and name validation helpers
//! - `error` - Error types for update failures
//! - `result` - Result types for update outcomes

mod error;
mod executor;
mod ops;
mod result;
mod source;
mod validation;

pub use error::{MutationError, MutationResult};
pub use executor::UpdateExecutor;
pub use ops::{InsertPosition, OpKind};
pub use result::UpdateOutcome;
pub use source::{ContentSource, NodeSetSelector, Selector, SequenceContent};
pub use validation::{Content, ContentItem};
