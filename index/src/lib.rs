//! Xylem Index Synchronization
//!
//! Contracts keeping secondary indexes consistent with the primary tree.
//!
//! Responsibilities:
//! - Define the per-document listener attached for the duration of one
//!   structural change
//! - Define the worker interface external index maintainers implement
//! - Fan each touched-node event out to the workers as it happens

mod listener;
mod workers;

pub use listener::{ChangeKind, IndexListener};
pub use workers::{IndexWorker, SyncListener};
