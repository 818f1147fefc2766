//! The persisted document and its structural-edit primitives.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::sync::Arc;

use xylem_core::{DocumentId, NodeAddr, NodeId, NodeKind, NodeTree, Permissions, QName};
use xylem_index::{ChangeKind, IndexListener};

use crate::error::{DomError, DomResult};
use crate::node::NodePayload;

/// Structural churn accumulated since the document's last reorganization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FragmentationStats {
    edits: u64,
    displaced: u64,
}

impl FragmentationStats {
    /// Structural edits applied.
    pub fn edits(&self) -> u64 {
        self.edits
    }

    /// Nodes re-addressed by sibling shifts.
    pub fn displaced(&self) -> u64 {
        self.displaced
    }

    fn record_edit(&mut self) {
        self.edits += 1;
    }

    fn record_displaced(&mut self, count: u64) {
        self.displaced += count;
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Per-document metadata: permission set, last-modified timestamp, the
/// transient index-listener slot, and fragmentation statistics.
pub struct Metadata {
    permissions: Permissions,
    last_modified: u64,
    listener: Option<Arc<dyn IndexListener>>,
    frag: FragmentationStats,
}

impl Metadata {
    fn new(permissions: Permissions) -> Self {
        Self {
            permissions,
            last_modified: 0,
            listener: None,
            frag: FragmentationStats::default(),
        }
    }

    pub fn permissions(&self) -> &Permissions {
        &self.permissions
    }

    pub fn permissions_mut(&mut self) -> &mut Permissions {
        &mut self.permissions
    }

    pub fn last_modified(&self) -> u64 {
        self.last_modified
    }

    /// Stamp the document. Timestamps never move backwards.
    pub fn set_last_modified(&mut self, timestamp: u64) {
        self.last_modified = self.last_modified.max(timestamp);
    }

    /// Attach the index listener for one edit window. At most one listener
    /// is attached at a time; attaching replaces any leftover association.
    pub fn attach_listener(&mut self, listener: Arc<dyn IndexListener>) {
        self.listener = Some(listener);
    }

    /// Detach the listener. Idempotent; called unconditionally after the
    /// edit, error paths included.
    pub fn detach_listener(&mut self) {
        self.listener = None;
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    pub fn fragmentation(&self) -> &FragmentationStats {
        &self.frag
    }
}

impl Clone for Metadata {
    fn clone(&self) -> Self {
        // Listener associations are transient; they never survive a clone
        // (snapshots restored on abort must come back listener-free).
        Self {
            permissions: self.permissions.clone(),
            last_modified: self.last_modified,
            listener: None,
            frag: self.frag,
        }
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Metadata")
            .field("permissions", &self.permissions)
            .field("last_modified", &self.last_modified)
            .field("listener", &self.listener.is_some())
            .field("frag", &self.frag)
            .finish()
    }
}

/// A stored document: metadata plus the node tree keyed by structural
/// address. Every structural edit pushes the touched nodes to the attached
/// index listener (if any) and feeds the fragmentation statistics.
#[derive(Debug, Clone)]
pub struct Document {
    id: DocumentId,
    path: String,
    metadata: Metadata,
    nodes: BTreeMap<NodeAddr, NodePayload>,
}

impl Document {
    /// Build a document from a detached tree. The initial build does not
    /// count as structural churn.
    pub fn from_tree(
        id: DocumentId,
        path: impl Into<String>,
        permissions: Permissions,
        tree: &NodeTree,
    ) -> Self {
        let mut doc = Self {
            id,
            path: path.into(),
            metadata: Metadata::new(permissions),
            nodes: BTreeMap::new(),
        };
        doc.place(NodeAddr::root(), tree);
        doc.metadata.frag.reset();
        doc
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    /// Address of the root element.
    pub fn root(&self) -> DomResult<NodeAddr> {
        let root = NodeAddr::root();
        if self.nodes.contains_key(&root) {
            Ok(root)
        } else {
            Err(DomError::NoRoot)
        }
    }

    pub fn node(&self, addr: &NodeAddr) -> Option<&NodePayload> {
        self.nodes.get(addr)
    }

    pub fn contains(&self, addr: &NodeAddr) -> bool {
        self.nodes.contains_key(addr)
    }

    /// Total number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Parent address, if the node exists and is not the root.
    pub fn parent_of(&self, addr: &NodeAddr) -> Option<NodeAddr> {
        let parent = addr.parent()?;
        self.nodes.contains_key(&parent).then_some(parent)
    }

    /// Child addresses in document order (attributes included).
    pub fn children(&self, addr: &NodeAddr) -> Vec<NodeAddr> {
        self.nodes
            .range::<NodeAddr, _>((Bound::Excluded(addr), Bound::Unbounded))
            .map(|(k, _)| k)
            .take_while(|k| addr.is_ancestor_of(k))
            .filter(|k| addr.is_parent_of(k))
            .cloned()
            .collect()
    }

    /// Child addresses excluding attributes.
    pub fn element_children(&self, addr: &NodeAddr) -> Vec<NodeAddr> {
        self.children(addr)
            .into_iter()
            .filter(|c| self.nodes.get(c).is_some_and(|p| !p.is_attribute()))
            .collect()
    }

    /// Child elements with the given local name.
    pub fn child_elements_named(&self, addr: &NodeAddr, local: &str) -> Vec<NodeAddr> {
        self.children(addr)
            .into_iter()
            .filter(|c| {
                self.nodes.get(c).is_some_and(|p| {
                    p.kind() == NodeKind::Element && p.name().is_some_and(|n| n.local == local)
                })
            })
            .collect()
    }

    /// The subtree rooted at `addr` (itself included), in document order.
    pub fn subtree(&self, addr: &NodeAddr) -> Vec<NodeAddr> {
        self.nodes
            .range::<NodeAddr, _>((Bound::Included(addr), Bound::Unbounded))
            .map(|(k, _)| k)
            .take_while(|k| *k == addr || addr.is_ancestor_of(k))
            .cloned()
            .collect()
    }

    /// First free child slot of a node.
    pub fn next_child_slot(&self, addr: &NodeAddr) -> NodeAddr {
        let next = self
            .children(addr)
            .last()
            .map(|c| c.position() + 1)
            .unwrap_or(1);
        addr.child(next)
    }

    /// Rebuild the subtree at `addr` as a detached tree (a deep copy).
    pub fn materialize(&self, addr: &NodeAddr) -> Option<NodeTree> {
        let payload = self.nodes.get(addr)?;
        Some(match payload {
            NodePayload::Element { name } => NodeTree::Element {
                name: name.clone(),
                children: self
                    .children(addr)
                    .iter()
                    .filter_map(|c| self.materialize(c))
                    .collect(),
            },
            NodePayload::Text { value } => NodeTree::Text(value.clone()),
            NodePayload::Attribute { name, value } => NodeTree::Attribute {
                name: name.clone(),
                value: value.clone(),
            },
        })
    }

    /// Concatenated text content of the subtree at `addr`.
    pub fn string_value(&self, addr: &NodeAddr) -> Option<String> {
        self.materialize(addr).map(|t| t.string_value())
    }

    // ========== Structural edits ==========

    /// Insert a detached tree with its root at `at`. The slot must be free.
    /// Returns the number of nodes inserted.
    pub fn insert_tree(&mut self, at: NodeAddr, tree: &NodeTree) -> usize {
        let inserted = self.place(at, tree);
        self.metadata.frag.record_edit();
        inserted
    }

    /// Remove the node at `addr` together with its subtree.
    /// Returns the number of nodes removed.
    pub fn remove_subtree(&mut self, addr: &NodeAddr) -> DomResult<usize> {
        if !self.nodes.contains_key(addr) {
            return Err(DomError::NodeNotFound(addr.clone()));
        }
        let removed = self.subtree(addr);
        for key in &removed {
            self.nodes.remove(key);
            self.emit(key, ChangeKind::Remove);
        }
        self.metadata.frag.record_edit();
        Ok(removed.len())
    }

    /// Replace the subtree at `addr` with a detached tree rooted at the
    /// same address.
    pub fn replace_subtree(&mut self, addr: &NodeAddr, tree: &NodeTree) -> DomResult<()> {
        self.remove_subtree(addr)?;
        self.insert_tree(addr.clone(), tree);
        Ok(())
    }

    /// Splice trees in as children of `parent`, starting at child position
    /// `at_pos` (1-based). Existing children at that position and after are
    /// shifted right, subtrees re-addressed.
    pub fn insert_siblings(
        &mut self,
        parent: &NodeAddr,
        at_pos: u32,
        trees: &[NodeTree],
    ) -> DomResult<()> {
        let payload = self
            .nodes
            .get(parent)
            .ok_or_else(|| DomError::NodeNotFound(parent.clone()))?;
        if payload.kind() != NodeKind::Element {
            return Err(DomError::kind_mismatch(
                parent.clone(),
                NodeKind::Element,
                payload.kind(),
            ));
        }

        let shift = trees.len() as u32;
        // Shift in descending position order so targets are always free.
        let to_shift: Vec<NodeAddr> = self
            .children(parent)
            .into_iter()
            .filter(|c| c.position() >= at_pos)
            .rev()
            .collect();
        for child in to_shift {
            self.move_subtree(&child, &parent.child(child.position() + shift));
        }

        for (i, tree) in trees.iter().enumerate() {
            self.insert_tree(parent.child(at_pos + i as u32), tree);
        }
        Ok(())
    }

    /// Rename an element or attribute, preserving children and value.
    pub fn rename_node(&mut self, addr: &NodeAddr, new_name: QName) -> DomResult<()> {
        let payload = self
            .nodes
            .get_mut(addr)
            .ok_or_else(|| DomError::NodeNotFound(addr.clone()))?;
        match payload {
            NodePayload::Element { name } | NodePayload::Attribute { name, .. } => {
                *name = new_name;
            }
            NodePayload::Text { .. } => {
                return Err(DomError::kind_mismatch(
                    addr.clone(),
                    NodeKind::Element,
                    NodeKind::Text,
                ));
            }
        }
        self.emit(addr, ChangeKind::Update);
        self.metadata.frag.record_edit();
        Ok(())
    }

    /// Overwrite the value of a text or attribute node.
    pub fn set_value(&mut self, addr: &NodeAddr, new_value: impl Into<String>) -> DomResult<()> {
        let payload = self
            .nodes
            .get_mut(addr)
            .ok_or_else(|| DomError::NodeNotFound(addr.clone()))?;
        match payload {
            NodePayload::Text { value } | NodePayload::Attribute { value, .. } => {
                *value = new_value.into();
            }
            NodePayload::Element { .. } => {
                return Err(DomError::kind_mismatch(
                    addr.clone(),
                    NodeKind::Text,
                    NodeKind::Element,
                ));
            }
        }
        self.emit(addr, ChangeKind::Update);
        self.metadata.frag.record_edit();
        Ok(())
    }

    /// Replace an element's content with a single text node, preserving its
    /// attributes.
    pub fn replace_children_with_text(&mut self, addr: &NodeAddr, text: &str) -> DomResult<()> {
        let payload = self
            .nodes
            .get(addr)
            .ok_or_else(|| DomError::NodeNotFound(addr.clone()))?;
        if payload.kind() != NodeKind::Element {
            return Err(DomError::kind_mismatch(
                addr.clone(),
                NodeKind::Element,
                payload.kind(),
            ));
        }

        let mut last_attr_pos = 0;
        for child in self.children(addr) {
            if self.nodes.get(&child).is_some_and(NodePayload::is_attribute) {
                last_attr_pos = child.position();
            } else {
                self.remove_subtree(&child)?;
            }
        }
        self.insert_tree(addr.child(last_attr_pos + 1), &NodeTree::text(text));
        Ok(())
    }

    /// Rebuild dense addresses (children numbered 1..n per parent) and reset
    /// the fragmentation statistics. Returns the (old, new) address of every
    /// relocated node so callers can refresh address-keyed indexes.
    pub fn reorganize(&mut self) -> Vec<(NodeAddr, NodeAddr)> {
        let mut renumbered = BTreeMap::new();
        let mut moves = Vec::new();
        if self.nodes.contains_key(&NodeAddr::root()) {
            self.renumber_into(
                &NodeAddr::root(),
                NodeAddr::root(),
                &mut renumbered,
                &mut moves,
            );
        }
        self.nodes = renumbered;
        self.metadata.frag.reset();
        moves
    }

    // ========== Internal helpers ==========

    fn place(&mut self, at: NodeAddr, tree: &NodeTree) -> usize {
        debug_assert!(!self.nodes.contains_key(&at), "address {at} already live");
        let mut inserted = 1;
        match tree {
            NodeTree::Element { name, children } => {
                self.nodes
                    .insert(at.clone(), NodePayload::Element { name: name.clone() });
                for (i, child) in children.iter().enumerate() {
                    inserted += self.place(at.child(i as u32 + 1), child);
                }
            }
            NodeTree::Text(value) => {
                self.nodes.insert(
                    at.clone(),
                    NodePayload::Text {
                        value: value.clone(),
                    },
                );
            }
            NodeTree::Attribute { name, value } => {
                self.nodes.insert(
                    at.clone(),
                    NodePayload::Attribute {
                        name: name.clone(),
                        value: value.clone(),
                    },
                );
            }
        }
        self.emit(&at, ChangeKind::Add);
        inserted
    }

    fn move_subtree(&mut self, from: &NodeAddr, to: &NodeAddr) {
        let keys = self.subtree(from);
        // Detach the whole run first; source and target ranges may overlap.
        let mut detached = Vec::with_capacity(keys.len());
        for key in keys {
            let payload = self.nodes.remove(&key).expect("subtree key is live");
            detached.push((key, payload));
        }
        let moved = detached.len() as u64;
        for (old_key, payload) in detached {
            let new_key = rebase(&old_key, from, to);
            self.emit(&old_key, ChangeKind::Remove);
            self.nodes.insert(new_key.clone(), payload);
            self.emit(&new_key, ChangeKind::Add);
        }
        self.metadata.frag.record_displaced(moved);
    }

    fn renumber_into(
        &self,
        old: &NodeAddr,
        new: NodeAddr,
        out: &mut BTreeMap<NodeAddr, NodePayload>,
        moves: &mut Vec<(NodeAddr, NodeAddr)>,
    ) {
        if old != &new {
            moves.push((old.clone(), new.clone()));
        }
        out.insert(new.clone(), self.nodes[old].clone());
        for (i, child) in self.children(old).iter().enumerate() {
            self.renumber_into(child, new.child(i as u32 + 1), out, moves);
        }
    }

    fn emit(&self, addr: &NodeAddr, change: ChangeKind) {
        if let Some(listener) = &self.metadata.listener {
            listener.node_changed(&NodeId::new(self.id, addr.clone()), change);
        }
    }
}

/// Re-root an address from `old_root` onto `new_root`, keeping the suffix.
fn rebase(addr: &NodeAddr, old_root: &NodeAddr, new_root: &NodeAddr) -> NodeAddr {
    let mut path = new_root.path().to_vec();
    path.extend_from_slice(&addr.path()[old_root.level()..]);
    NodeAddr::from_path(path)
}
