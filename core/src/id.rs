//! Identity types for documents and nodes.
//!
//! A node is addressed by a (document id, structural address) pair. The
//! structural address is a level-order path, so ancestor/descendant and
//! sibling relations between two nodes are decidable by comparing the
//! addresses alone, without dereferencing the tree.

use std::fmt;

/// Unique identifier for a stored document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(pub u32);

impl DocumentId {
    /// Create a new DocumentId from a raw value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw value.
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "d{}", self.0)
    }
}

/// Document-relative structural address: a dotted level-order path.
///
/// The root element is `1`, its first child `1.1`, the second child of that
/// child `1.1.2`, and so on. Lexicographic comparison of the level vector
/// is exactly document order (a parent sorts before its descendants, and
/// siblings sort by position).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeAddr(Vec<u32>);

impl NodeAddr {
    /// Address of a document's root element.
    pub fn root() -> Self {
        Self(vec![1])
    }

    /// Build an address from its level components. Empty paths are not
    /// valid addresses; callers construct from `root()` downward.
    pub fn from_path(path: Vec<u32>) -> Self {
        debug_assert!(!path.is_empty());
        Self(path)
    }

    /// Number of levels (the root is at level 1).
    pub fn level(&self) -> usize {
        self.0.len()
    }

    /// Position among siblings (the last path component).
    pub fn position(&self) -> u32 {
        *self.0.last().unwrap_or(&0)
    }

    /// Address of the parent, or None for the root.
    pub fn parent(&self) -> Option<NodeAddr> {
        if self.0.len() <= 1 {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Address of the n-th child (1-based).
    pub fn child(&self, n: u32) -> NodeAddr {
        let mut path = self.0.clone();
        path.push(n);
        Self(path)
    }

    /// Address of this node's sibling at the given position.
    pub fn sibling(&self, n: u32) -> NodeAddr {
        let mut path = self.0.clone();
        *path.last_mut().unwrap() = n;
        Self(path)
    }

    /// True if `self` is a strict ancestor of `other`.
    pub fn is_ancestor_of(&self, other: &NodeAddr) -> bool {
        other.0.len() > self.0.len() && other.0[..self.0.len()] == self.0[..]
    }

    /// True if `self` is the parent of `other`.
    pub fn is_parent_of(&self, other: &NodeAddr) -> bool {
        other.0.len() == self.0.len() + 1 && other.0[..self.0.len()] == self.0[..]
    }

    /// True if both addresses share a parent (a node is not its own sibling).
    pub fn is_sibling_of(&self, other: &NodeAddr) -> bool {
        self != other && self.parent() == other.parent()
    }

    /// Path components, root level first.
    pub fn path(&self) -> &[u32] {
        &self.0
    }
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

/// Fully qualified node identifier: (document id, structural address).
///
/// Unique within a document at any instant; the document never keeps two
/// live nodes under the same address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    doc: DocumentId,
    addr: NodeAddr,
}

impl NodeId {
    /// Create a node identifier.
    pub fn new(doc: DocumentId, addr: NodeAddr) -> Self {
        Self { doc, addr }
    }

    /// Owning document.
    pub fn doc(&self) -> DocumentId {
        self.doc
    }

    /// Structural address within the document.
    pub fn addr(&self) -> &NodeAddr {
        &self.addr
    }

    /// True if `self` is a strict ancestor of `other` (same document only).
    pub fn is_ancestor_of(&self, other: &NodeId) -> bool {
        self.doc == other.doc && self.addr.is_ancestor_of(&other.addr)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.doc, self.addr)
    }
}
