//! Index workers and the listener that feeds them.

use std::sync::Arc;
use xylem_core::NodeId;

use crate::listener::{ChangeKind, IndexListener};

/// Implemented by external index maintainers (structural, full-text).
/// Events arrive while the originating document's locks are held, so a
/// worker that re-reads sees exactly the state being indexed.
pub trait IndexWorker: Send + Sync {
    fn node_changed(&self, node: &NodeId, change: ChangeKind);
}

/// Listener forwarding each event to every registered worker immediately.
pub struct SyncListener {
    workers: Vec<Arc<dyn IndexWorker>>,
}

impl SyncListener {
    pub fn new(workers: Vec<Arc<dyn IndexWorker>>) -> Self {
        Self { workers }
    }
}

impl IndexListener for SyncListener {
    fn node_changed(&self, node: &NodeId, change: ChangeKind) {
        for worker in &self.workers {
            worker.node_changed(node, change);
        }
    }
}
