//! Update outcome types.

use xylem_dom::DocumentSet;

/// Outcome of one update operation. An empty selection yields the no-op
/// outcome; callers never see a partial result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    nodes_modified: usize,
    documents: DocumentSet,
}

impl UpdateOutcome {
    /// The terminal outcome of an empty selection.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn new(nodes_modified: usize, documents: DocumentSet) -> Self {
        Self {
            nodes_modified,
            documents,
        }
    }

    pub fn nodes_modified(&self) -> usize {
        self.nodes_modified
    }

    /// Documents that committed an edit in this operation.
    pub fn documents(&self) -> &DocumentSet {
        &self.documents
    }

    pub fn is_noop(&self) -> bool {
        self.nodes_modified == 0
    }
}
