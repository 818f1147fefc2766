//! Test fixtures: preconfigured stores, sample documents, recorders, and
//! an injectable failing journal.

use std::time::Duration;

use parking_lot::Mutex;
use xylem_core::{DocumentId, NodeId, NodeTree, Permissions, Principal};
use xylem_index::{ChangeKind, IndexWorker};
use xylem_store::{DefragConfig, LockConfig, Store, StoreConfig, UpdateSubscriber};
use xylem_txn::{Journal, JournalError, JournalResult, Lsn, MemoryJournal, WalEntry};

/// A store with a short lock timeout so contention tests stay fast.
pub fn test_store() -> Store {
    Store::new(StoreConfig {
        lock: LockConfig {
            timeout: Duration::from_millis(200),
        },
        defrag: DefragConfig::default(),
    })
}

/// A store whose fragmentation thresholds trip after a couple of edits.
pub fn defrag_store() -> Store {
    Store::new(StoreConfig {
        lock: LockConfig {
            timeout: Duration::from_millis(200),
        },
        defrag: DefragConfig {
            edit_threshold: 2,
            displaced_threshold: 2,
        },
    })
}

/// `<test><n>1</n></test>`, the canonical scenario document.
pub fn sample_tree() -> NodeTree {
    NodeTree::element("test").with_child(NodeTree::element("n").with_child(NodeTree::text("1")))
}

/// `<name>text</name>` as detached content.
pub fn element(name: &str, text: &str) -> NodeTree {
    NodeTree::element(name).with_child(NodeTree::text(text))
}

/// Store the sample document at `path`, owned by admin.
pub fn store_sample(store: &Store, path: &str) -> DocumentId {
    store
        .store_document(path, Permissions::new("admin", "dba", 0o664), &sample_tree())
        .expect("sample document stores")
}

pub fn admin() -> Principal {
    Principal::admin("admin")
}

pub fn guest() -> Principal {
    Principal::user("guest")
}

/// Index worker that records every event it is handed.
#[derive(Default)]
pub struct RecordingWorker {
    events: Mutex<Vec<(NodeId, ChangeKind)>>,
}

impl RecordingWorker {
    pub fn events(&self) -> Vec<(NodeId, ChangeKind)> {
        self.events.lock().clone()
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().len()
    }
}

impl IndexWorker for RecordingWorker {
    fn node_changed(&self, node: &NodeId, change: ChangeKind) {
        self.events.lock().push((node.clone(), change));
    }
}

/// Subscriber that records post-commit update events.
#[derive(Default)]
pub struct RecordingSubscriber {
    events: Mutex<Vec<(DocumentId, ChangeKind)>>,
}

impl RecordingSubscriber {
    pub fn events(&self) -> Vec<(DocumentId, ChangeKind)> {
        self.events.lock().clone()
    }
}

impl UpdateSubscriber for RecordingSubscriber {
    fn document_updated(&self, doc: DocumentId, kind: ChangeKind) {
        self.events.lock().push((doc, kind));
    }
}

/// Journal that refuses commit records once its allowance runs out.
/// Injected to prove a failed commit has no visible effect; the allowance
/// lets fixture setup (document stores) commit normally first.
pub struct FailOnCommit {
    inner: MemoryJournal,
    allowed: usize,
}

impl FailOnCommit {
    /// Refuse every commit.
    pub fn new() -> Self {
        Self::after(0)
    }

    /// Let the first `allowed` commits through, refuse the rest.
    pub fn after(allowed: usize) -> Self {
        Self {
            inner: MemoryJournal::new(),
            allowed,
        }
    }
}

impl Default for FailOnCommit {
    fn default() -> Self {
        Self::new()
    }
}

impl Journal for FailOnCommit {
    fn append(&mut self, entry: WalEntry) -> JournalResult<Lsn> {
        if entry.is_commit() {
            if self.allowed == 0 {
                return Err(JournalError::WriteFailed("commit refused".into()));
            }
            self.allowed -= 1;
        }
        self.inner.append(entry)
    }

    fn sync(&mut self) -> JournalResult<()> {
        self.inner.sync()
    }
}

/// A short-timeout store whose journal refuses every commit after the
/// first `allowed`.
pub fn failing_commit_store(allowed: usize) -> Store {
    Store::with_journal(
        StoreConfig {
            lock: LockConfig {
                timeout: Duration::from_millis(200),
            },
            defrag: DefragConfig::default(),
        },
        Box::new(FailOnCommit::after(allowed)),
    )
}
