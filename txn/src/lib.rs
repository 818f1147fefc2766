//! Xylem Transactions
//!
//! The atomicity boundary for multi-node edits.
//!
//! Responsibilities:
//! - Append operation records to the write-ahead journal before commit
//! - Capture a pre-image snapshot of each document on first touch
//! - Restore snapshots on abort (or failed commit) so callers never
//!   observe partial effects
//! - Hand out transaction handles via begin/commit/abort

mod error;
mod journal;
mod manager;

pub use error::{TransactionError, TxnResult};
pub use journal::{Journal, JournalError, JournalResult, Lsn, MemoryJournal, TxnId, WalEntry, WalRecord};
pub use manager::{TransactionManager, Txn, TxnState};
