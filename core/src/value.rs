//! Item and sequence values.
//!
//! Selectors and content expressions hand the mutation engine flat
//! sequences of items. An item is either a node (a reference to a stored
//! node, or a constructed detached tree) or an atomic value.

use crate::{NodeId, NodeTree};
use std::fmt;

/// An atomic (non-node) value.
#[derive(Debug, Clone, PartialEq)]
pub enum AtomicValue {
    String(String),
    Integer(i64),
    Double(f64),
    Boolean(bool),
}

impl AtomicValue {
    /// Lexical form of the value.
    pub fn string_value(&self) -> String {
        match self {
            AtomicValue::String(s) => s.clone(),
            AtomicValue::Integer(i) => i.to_string(),
            AtomicValue::Double(d) => d.to_string(),
            AtomicValue::Boolean(b) => b.to_string(),
        }
    }
}

impl fmt::Display for AtomicValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string_value())
    }
}

/// A node-typed item: stored (addressable in some document) or constructed.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Stored(NodeId),
    Constructed(NodeTree),
}

/// One item of a sequence.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Node(NodeValue),
    Atomic(AtomicValue),
}

impl Item {
    /// Convenience constructor for a stored-node item.
    pub fn stored(id: NodeId) -> Self {
        Item::Node(NodeValue::Stored(id))
    }

    /// Convenience constructor for a constructed-node item.
    pub fn constructed(tree: NodeTree) -> Self {
        Item::Node(NodeValue::Constructed(tree))
    }

    /// Convenience constructor for a string atomic.
    pub fn string(s: impl Into<String>) -> Self {
        Item::Atomic(AtomicValue::String(s.into()))
    }

    /// True if the item is node-typed.
    pub fn is_node(&self) -> bool {
        matches!(self, Item::Node(_))
    }

    /// The constructed tree, if this is one.
    pub fn as_tree(&self) -> Option<&NodeTree> {
        match self {
            Item::Node(NodeValue::Constructed(tree)) => Some(tree),
            _ => None,
        }
    }

    /// The stored node id, if this is one.
    pub fn as_stored(&self) -> Option<&NodeId> {
        match self {
            Item::Node(NodeValue::Stored(id)) => Some(id),
            _ => None,
        }
    }

    /// String value of the item. Stored nodes have no value until they are
    /// materialized; content capture resolves them first.
    pub fn string_value(&self) -> String {
        match self {
            Item::Node(NodeValue::Constructed(tree)) => tree.string_value(),
            Item::Node(NodeValue::Stored(_)) => String::new(),
            Item::Atomic(value) => value.string_value(),
        }
    }
}

/// An ordered sequence of items.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sequence(Vec<Item>);

impl Sequence {
    /// The distinguished empty sequence.
    pub const EMPTY: Sequence = Sequence(Vec::new());

    /// Create an empty sequence.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Create a sequence from items.
    pub fn from_items(items: Vec<Item>) -> Self {
        Self(items)
    }

    /// Sequence holding a single item.
    pub fn one(item: Item) -> Self {
        Self(vec![item])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, item: Item) {
        self.0.push(item);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.0.iter()
    }

    /// First item, if any.
    pub fn first(&self) -> Option<&Item> {
        self.0.first()
    }

    /// Concatenated string value of all items.
    pub fn string_value(&self) -> String {
        let mut out = String::new();
        for item in &self.0 {
            out.push_str(&item.string_value());
        }
        out
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<Item> for Sequence {
    fn from_iter<T: IntoIterator<Item = Item>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
