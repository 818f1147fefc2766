//! Post-commit update notification.
//!
//! Subscribers only ever observe committed state: the executor fans out
//! after the transaction boundary, never from inside an apply loop.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;
use xylem_core::DocumentId;
use xylem_index::ChangeKind;

/// Receives a signal that a document reached a new committed version.
pub trait UpdateSubscriber: Send + Sync {
    fn document_updated(&self, doc: DocumentId, kind: ChangeKind);
}

/// Fan-out registry for [`UpdateSubscriber`]s.
#[derive(Default)]
pub struct NotificationService {
    subscribers: RwLock<Vec<Arc<dyn UpdateSubscriber>>>,
}

impl NotificationService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, subscriber: Arc<dyn UpdateSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Deliver one committed-update signal per subscriber, in
    /// subscription order.
    pub fn notify_update(&self, doc: DocumentId, kind: ChangeKind) {
        let subscribers = self.subscribers.read();
        debug!(doc = %doc, ?kind, subscribers = subscribers.len(), "update notification");
        for subscriber in subscribers.iter() {
            subscriber.document_updated(doc, kind);
        }
    }
}
