//! Stored node payloads.

use xylem_core::{NodeKind, QName};

/// The data stored at one address of a document tree. Structure (parent,
/// children, order) lives entirely in the addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodePayload {
    Element { name: QName },
    Text { value: String },
    Attribute { name: QName, value: String },
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Element { .. } => NodeKind::Element,
            NodePayload::Text { .. } => NodeKind::Text,
            NodePayload::Attribute { .. } => NodeKind::Attribute,
        }
    }

    /// The node's name, for named kinds.
    pub fn name(&self) -> Option<&QName> {
        match self {
            NodePayload::Element { name } => Some(name),
            NodePayload::Attribute { name, .. } => Some(name),
            NodePayload::Text { .. } => None,
        }
    }

    /// The node's own value, for valued kinds.
    pub fn value(&self) -> Option<&str> {
        match self {
            NodePayload::Text { value } => Some(value),
            NodePayload::Attribute { value, .. } => Some(value),
            NodePayload::Element { .. } => None,
        }
    }

    pub fn is_attribute(&self) -> bool {
        matches!(self, NodePayload::Attribute { .. })
    }
}
