//! NodeSet and DocumentSet: the containers selectors, locks, and
//! notifications are expressed in.

use std::collections::BTreeSet;
use xylem_core::{DocumentId, NodeId};

/// Ordered, deduplicated set of node identifiers.
///
/// Iteration order is first-insertion order, which is what makes the APPLY
/// loop's node ordering stable and reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeSet {
    entries: Vec<NodeId>,
    seen: BTreeSet<NodeId>,
}

impl NodeSet {
    /// The distinguished empty set.
    pub const EMPTY: NodeSet = NodeSet {
        entries: Vec::new(),
        seen: BTreeSet::new(),
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Insert, keeping first-insertion order. Duplicates are ignored.
    /// Returns true if the node was newly added.
    pub fn insert(&mut self, node: NodeId) -> bool {
        if self.seen.insert(node.clone()) {
            self.entries.push(node);
            true
        } else {
            false
        }
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.seen.contains(node)
    }

    /// True if the set holds a strict ancestor of `node`. Used to derive
    /// lock sets: editing a node is editing everything beneath it.
    pub fn contains_ancestor_of(&self, node: &NodeId) -> bool {
        self.entries.iter().any(|n| n.is_ancestor_of(node))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NodeId> {
        self.entries.iter()
    }

    /// Union, preserving this set's order followed by the other's novel
    /// entries.
    pub fn union(&self, other: &NodeSet) -> NodeSet {
        let mut out = self.clone();
        for node in other.iter() {
            out.insert(node.clone());
        }
        out
    }

    /// The distinct owning documents, in ascending id order.
    pub fn document_set(&self) -> DocumentSet {
        let mut docs = DocumentSet::new();
        for node in &self.entries {
            docs.insert(node.doc());
        }
        docs
    }
}

impl FromIterator<NodeId> for NodeSet {
    fn from_iter<T: IntoIterator<Item = NodeId>>(iter: T) -> Self {
        let mut set = NodeSet::new();
        for node in iter {
            set.insert(node);
        }
        set
    }
}

impl<'a> IntoIterator for &'a NodeSet {
    type Item = &'a NodeId;
    type IntoIter = std::slice::Iter<'a, NodeId>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Deduplicated set of document ids, iterated in ascending order — the
/// granularity of locking and notification. Ascending iteration is what
/// the lock coordinator's deadlock-avoidance ordering is built on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSet(BTreeSet<DocumentId>);

impl DocumentSet {
    pub const EMPTY: DocumentSet = DocumentSet(BTreeSet::new());

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, doc: DocumentId) -> bool {
        self.0.insert(doc)
    }

    pub fn contains(&self, doc: DocumentId) -> bool {
        self.0.contains(&doc)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ascending document-id order.
    pub fn iter(&self) -> impl Iterator<Item = DocumentId> + '_ {
        self.0.iter().copied()
    }

    /// True if the two sets share no document.
    pub fn is_disjoint(&self, other: &DocumentSet) -> bool {
        self.0.is_disjoint(&other.0)
    }
}

impl FromIterator<DocumentId> for DocumentSet {
    fn from_iter<T: IntoIterator<Item = DocumentId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
