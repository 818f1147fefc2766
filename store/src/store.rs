//! The shared document store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use tracing::{debug, info};
use xylem_core::{DocumentId, NodeTree, Permissions};
use xylem_dom::Document;
use xylem_index::{ChangeKind, IndexListener, IndexWorker, SyncListener};
use xylem_txn::{Journal, TransactionManager, Txn, WalEntry};

use crate::defrag::{DefragConfig, FragmentationAuditor};
use crate::error::{StoreError, StoreResult};
use crate::lock::{LockConfig, LockManager};
use crate::notify::NotificationService;

/// Store configuration, passed at construction.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    pub lock: LockConfig,
    pub defrag: DefragConfig,
}

/// The document store: registry, lock coordinator, transaction manager,
/// fragmentation auditor, and post-commit notifier under one roof.
///
/// Documents are held behind their own `RwLock` so readers of one document
/// never contend with writers of another; the protocol-level lock
/// coordinator is what serializes whole updates.
pub struct Store {
    documents: RwLock<BTreeMap<DocumentId, Arc<RwLock<Document>>>>,
    paths: RwLock<BTreeMap<String, DocumentId>>,
    locks: LockManager,
    txns: TransactionManager,
    notifier: NotificationService,
    auditor: FragmentationAuditor,
    workers: RwLock<Vec<Arc<dyn IndexWorker>>>,
    next_doc_id: AtomicU32,
    clock: AtomicU64,
}

impl Store {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_journal(config, Box::new(xylem_txn::MemoryJournal::new()))
    }

    pub fn with_journal(config: StoreConfig, journal: Box<dyn Journal>) -> Self {
        Self {
            documents: RwLock::new(BTreeMap::new()),
            paths: RwLock::new(BTreeMap::new()),
            locks: LockManager::new(config.lock),
            txns: TransactionManager::with_journal(journal),
            notifier: NotificationService::new(),
            auditor: FragmentationAuditor::new(config.defrag),
            workers: RwLock::new(Vec::new()),
            next_doc_id: AtomicU32::new(1),
            clock: AtomicU64::new(0),
        }
    }

    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    pub fn transactions(&self) -> &TransactionManager {
        &self.txns
    }

    pub fn notifier(&self) -> &NotificationService {
        &self.notifier
    }

    pub fn auditor(&self) -> &FragmentationAuditor {
        &self.auditor
    }

    pub fn register_worker(&self, worker: Arc<dyn IndexWorker>) {
        self.workers.write().push(worker);
    }

    /// A fresh listener fanning out to the currently registered index
    /// workers, or `None` when no worker is registered.
    pub fn index_listener(&self) -> Option<Arc<dyn IndexListener>> {
        let workers = self.workers.read();
        if workers.is_empty() {
            None
        } else {
            Some(Arc::new(SyncListener::new(workers.clone())))
        }
    }

    /// Store a new document built from a detached tree, under its own
    /// short internal transaction.
    pub fn store_document(
        &self,
        path: &str,
        permissions: Permissions,
        tree: &NodeTree,
    ) -> StoreResult<DocumentId> {
        if self.paths.read().contains_key(path) {
            return Err(StoreError::PathOccupied(path.to_string()));
        }
        let id = DocumentId::new(self.next_doc_id.fetch_add(1, Ordering::Relaxed));
        let mut doc = Document::from_tree(id, path, permissions, tree);
        doc.metadata_mut().set_last_modified(self.next_timestamp());

        let mut txn = self.txns.begin()?;
        self.txns.record(
            &txn,
            WalEntry::StoreDocument {
                txn_id: txn.id(),
                doc_id: id,
                nodes: doc.node_count(),
            },
        )?;
        self.txns.commit(&mut txn)?;

        self.documents.write().insert(id, Arc::new(RwLock::new(doc)));
        self.paths.write().insert(path.to_string(), id);
        info!(doc = %id, path, "document stored");
        self.notifier.notify_update(id, ChangeKind::Add);
        Ok(id)
    }

    pub fn document(&self, id: DocumentId) -> StoreResult<Arc<RwLock<Document>>> {
        self.documents
            .read()
            .get(&id)
            .cloned()
            .ok_or(StoreError::DocumentNotFound(id))
    }

    pub fn document_by_path(&self, path: &str) -> Option<DocumentId> {
        self.paths.read().get(path).copied()
    }

    pub fn begin(&self) -> StoreResult<Txn> {
        Ok(self.txns.begin()?)
    }

    /// Journal the document's post-edit representation under the
    /// transaction.
    pub fn persist(&self, txn: &Txn, doc: &Document) -> StoreResult<()> {
        self.txns.record(
            txn,
            WalEntry::StoreDocument {
                txn_id: txn.id(),
                doc_id: doc.id(),
                nodes: doc.node_count(),
            },
        )?;
        Ok(())
    }

    /// Commit. A journal failure aborts the transaction and restores every
    /// touched document's pre-image before the error propagates, so a
    /// failed commit has no visible effect.
    pub fn commit(&self, txn: &mut Txn) -> StoreResult<()> {
        if let Err(e) = self.txns.commit(txn) {
            self.abort(txn);
            return Err(e.into());
        }
        Ok(())
    }

    /// Abort, restoring every touched document to its pre-image.
    pub fn abort(&self, txn: &mut Txn) {
        let snapshots = self.txns.abort(txn);
        if snapshots.is_empty() {
            return;
        }
        let documents = self.documents.read();
        for (id, pre_image) in snapshots {
            if let Some(slot) = documents.get(&id) {
                *slot.write() = pre_image;
                debug!(doc = %id, "pre-image restored");
            }
        }
    }

    /// Physically reorganize the document's tree. Address moves are
    /// forwarded to the index workers as a remove of the old address and
    /// an add of the new one.
    pub fn defragment(&self, txn: &Txn, doc: &mut Document) -> StoreResult<()> {
        self.txns.record(
            txn,
            WalEntry::Reorganize {
                txn_id: txn.id(),
                doc_id: doc.id(),
            },
        )?;
        let moves = doc.reorganize();
        info!(doc = %doc.id(), moved = moves.len(), "document reorganized");
        let workers = self.workers.read();
        if workers.is_empty() {
            return Ok(());
        }
        for (old, new) in moves {
            let old_id = xylem_core::NodeId::new(doc.id(), old);
            let new_id = xylem_core::NodeId::new(doc.id(), new);
            for worker in workers.iter() {
                worker.node_changed(&old_id, ChangeKind::Remove);
                worker.node_changed(&new_id, ChangeKind::Add);
            }
        }
        Ok(())
    }

    /// A strictly increasing millisecond timestamp. Two commits never
    /// share a last-modified value, even within one clock tick.
    pub fn next_timestamp(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let mut prev = self.clock.load(Ordering::Relaxed);
        loop {
            let next = now.max(prev + 1);
            match self
                .clock
                .compare_exchange_weak(prev, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(seen) => prev = seen,
            }
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}
