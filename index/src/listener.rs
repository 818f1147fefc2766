//! The per-document index synchronization listener.

use xylem_core::NodeId;

/// What happened to a node or document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Update,
    Remove,
}

/// Transient hook attached to a document for the duration of one structural
/// change. The document pushes every touched node through this interface
/// while the edit runs; nothing is buffered, so all events for an edit
/// window are delivered before the listener is detached.
///
/// At most one listener is attached per document at a time, and it is always
/// detached before the document is next touched, error paths included.
pub trait IndexListener: Send + Sync {
    fn node_changed(&self, node: &NodeId, change: ChangeKind);
}
