//! Write-ahead journal.

use thiserror::Error;
use xylem_core::DocumentId;

/// Log sequence number - unique identifier for each journal record.
pub type Lsn = u64;

/// Transaction ID.
pub type TxnId = u64;

/// Journal entry types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalEntry {
    /// Begin a transaction.
    Begin { txn_id: TxnId },

    /// Commit a transaction.
    Commit { txn_id: TxnId },

    /// Abort a transaction.
    Abort { txn_id: TxnId },

    /// Persist a document's updated representation.
    StoreDocument {
        txn_id: TxnId,
        doc_id: DocumentId,
        nodes: usize,
    },

    /// Physical reorganization of a document's tree.
    Reorganize { txn_id: TxnId, doc_id: DocumentId },
}

impl WalEntry {
    /// Get the transaction ID for this entry.
    pub fn txn_id(&self) -> TxnId {
        match self {
            WalEntry::Begin { txn_id }
            | WalEntry::Commit { txn_id }
            | WalEntry::Abort { txn_id }
            | WalEntry::StoreDocument { txn_id, .. }
            | WalEntry::Reorganize { txn_id, .. } => *txn_id,
        }
    }

    /// Check if this is a commit entry.
    pub fn is_commit(&self) -> bool {
        matches!(self, WalEntry::Commit { .. })
    }

    /// Check if this is an abort entry.
    pub fn is_abort(&self) -> bool {
        matches!(self, WalEntry::Abort { .. })
    }
}

/// A journal record with its LSN.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalRecord {
    pub lsn: Lsn,
    pub entry: WalEntry,
}

impl WalRecord {
    pub fn new(lsn: Lsn, entry: WalEntry) -> Self {
        Self { lsn, entry }
    }
}

/// Journal errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JournalError {
    #[error("journal write failed: {0}")]
    WriteFailed(String),

    #[error("journal sync failed: {0}")]
    SyncFailed(String),
}

/// Result type for journal operations.
pub type JournalResult<T> = Result<T, JournalError>;

/// The write-ahead log the transaction manager appends to. Failure of
/// `append` or `sync` surfaces as a transaction failure, which is how
/// tests inject commit failures.
pub trait Journal: Send {
    /// Append an entry, returning its LSN.
    fn append(&mut self, entry: WalEntry) -> JournalResult<Lsn>;

    /// Make everything appended so far durable.
    fn sync(&mut self) -> JournalResult<()>;
}

/// In-memory journal for tests and ephemeral stores.
#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: Vec<WalRecord>,
    next_lsn: Lsn,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_lsn: 1,
        }
    }

    /// All recorded entries.
    pub fn entries(&self) -> &[WalRecord] {
        &self.entries
    }
}

impl Journal for MemoryJournal {
    fn append(&mut self, entry: WalEntry) -> JournalResult<Lsn> {
        let lsn = self.next_lsn;
        self.next_lsn += 1;
        self.entries.push(WalRecord::new(lsn, entry));
        Ok(lsn)
    }

    fn sync(&mut self) -> JournalResult<()> {
        Ok(())
    }
}
