//! Node building blocks: kinds, qualified names, detached trees.

use std::fmt;

/// The node kinds the mutation engine operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
    Attribute,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Element => "element",
            NodeKind::Text => "text",
            NodeKind::Attribute => "attribute",
        };
        f.write_str(name)
    }
}

/// A qualified name: optional prefix plus local part.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    /// Create a name with no prefix.
    pub fn new(local: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local: local.into(),
        }
    }

    /// Create a prefixed name.
    pub fn with_prefix(prefix: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local: local.into(),
        }
    }

    /// Split a lexical QName on the first colon. Lexical validation is the
    /// caller's concern; this only shapes the parts.
    pub fn parse(lexical: &str) -> Self {
        match lexical.split_once(':') {
            Some((prefix, local)) => Self::with_prefix(prefix, local),
            None => Self::new(lexical),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// A detached, fully-owned subtree.
///
/// This is the shape of constructed content: replacement and insertion
/// payloads are captured as NodeTrees before application, so later changes
/// to their source cannot leak into an edit already in flight. Attributes
/// of an element are ordinary children and precede its other children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTree {
    Element {
        name: QName,
        children: Vec<NodeTree>,
    },
    Text(String),
    Attribute {
        name: QName,
        value: String,
    },
}

impl NodeTree {
    /// Element with no children.
    pub fn element(name: impl Into<String>) -> Self {
        Self::Element {
            name: QName::new(name),
            children: Vec::new(),
        }
    }

    /// Text node.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Attribute node.
    pub fn attribute(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Attribute {
            name: QName::new(name),
            value: value.into(),
        }
    }

    /// Append a child and return self, builder-style.
    pub fn with_child(mut self, child: NodeTree) -> Self {
        if let NodeTree::Element { children, .. } = &mut self {
            children.push(child);
        }
        self
    }

    /// The kind of the tree's root node.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeTree::Element { .. } => NodeKind::Element,
            NodeTree::Text(_) => NodeKind::Text,
            NodeTree::Attribute { .. } => NodeKind::Attribute,
        }
    }

    /// Concatenated text content of the subtree.
    pub fn string_value(&self) -> String {
        match self {
            NodeTree::Text(value) => value.clone(),
            NodeTree::Attribute { value, .. } => value.clone(),
            NodeTree::Element { children, .. } => {
                let mut out = String::new();
                for child in children {
                    if !matches!(child, NodeTree::Attribute { .. }) {
                        out.push_str(&child.string_value());
                    }
                }
                out
            }
        }
    }

    /// Total node count of the subtree, root included.
    pub fn node_count(&self) -> usize {
        match self {
            NodeTree::Element { children, .. } => {
                1 + children.iter().map(NodeTree::node_count).sum::<usize>()
            }
            _ => 1,
        }
    }
}
