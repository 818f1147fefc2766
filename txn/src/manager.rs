//! Transaction manager and handles.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::{debug, warn};
use xylem_core::DocumentId;
use xylem_dom::Document;

use crate::error::{TransactionError, TxnResult};
use crate::journal::{Journal, Lsn, MemoryJournal, TxnId, WalEntry};

/// Lifecycle of a transaction handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnState {
    Active,
    Committed,
    Aborted,
}

/// A transaction handle covering all of one operation's edits.
///
/// The handle captures a pre-image of each touched document the first time
/// the document is edited under it. Abort hands those pre-images back so
/// the store can restore them wholesale; structural edits renumber entire
/// sibling runs, so the document is the only undo unit that is always
/// correct.
pub struct Txn {
    id: TxnId,
    state: TxnState,
    snapshots: BTreeMap<DocumentId, Document>,
}

impl Txn {
    pub fn id(&self) -> TxnId {
        self.id
    }

    pub fn state(&self) -> TxnState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == TxnState::Active
    }

    /// Capture the document's pre-image. Only the first call per document
    /// records anything; later calls see the document already covered.
    pub fn snapshot(&mut self, doc: &Document) {
        self.snapshots.entry(doc.id()).or_insert_with(|| doc.clone());
    }

    pub fn has_snapshot(&self, doc_id: DocumentId) -> bool {
        self.snapshots.contains_key(&doc_id)
    }

    /// Documents covered by pre-images, ascending.
    pub fn touched(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.snapshots.keys().copied()
    }
}

/// Hands out transaction handles and writes the journal.
pub struct TransactionManager {
    journal: Mutex<Box<dyn Journal>>,
    next_txn_id: AtomicU64,
}

impl TransactionManager {
    /// Manager over an in-memory journal.
    pub fn new() -> Self {
        Self::with_journal(Box::new(MemoryJournal::new()))
    }

    /// Manager over a caller-supplied journal.
    pub fn with_journal(journal: Box<dyn Journal>) -> Self {
        Self {
            journal: Mutex::new(journal),
            next_txn_id: AtomicU64::new(1),
        }
    }

    /// Begin a new transaction.
    pub fn begin(&self) -> TxnResult<Txn> {
        let id = self.next_txn_id.fetch_add(1, Ordering::Relaxed);
        self.journal.lock().append(WalEntry::Begin { txn_id: id })?;
        debug!(txn_id = id, "transaction started");
        Ok(Txn {
            id,
            state: TxnState::Active,
            snapshots: BTreeMap::new(),
        })
    }

    /// Journal an operation record under the transaction.
    pub fn record(&self, txn: &Txn, entry: WalEntry) -> TxnResult<Lsn> {
        self.ensure_active(txn)?;
        debug_assert_eq!(entry.txn_id(), txn.id());
        Ok(self.journal.lock().append(entry)?)
    }

    /// Commit: journal the commit record and make it durable. On failure
    /// the handle stays active so the caller can abort and restore.
    pub fn commit(&self, txn: &mut Txn) -> TxnResult<()> {
        self.ensure_active(txn)?;
        {
            let mut journal = self.journal.lock();
            journal.append(WalEntry::Commit { txn_id: txn.id })?;
            journal.sync()?;
        }
        txn.state = TxnState::Committed;
        txn.snapshots.clear();
        debug!(txn_id = txn.id, "transaction committed");
        Ok(())
    }

    /// Abort: journal the abort record (best effort) and hand back the
    /// pre-images for restoration.
    pub fn abort(&self, txn: &mut Txn) -> BTreeMap<DocumentId, Document> {
        if txn.state != TxnState::Active {
            return BTreeMap::new();
        }
        if let Err(e) = self.journal.lock().append(WalEntry::Abort { txn_id: txn.id }) {
            warn!(txn_id = txn.id, error = %e, "failed to journal abort record");
        }
        txn.state = TxnState::Aborted;
        debug!(txn_id = txn.id, "transaction aborted");
        std::mem::take(&mut txn.snapshots)
    }

    fn ensure_active(&self, txn: &Txn) -> TxnResult<()> {
        if txn.is_active() {
            Ok(())
        } else {
            Err(TransactionError::NotActive(txn.id))
        }
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}
