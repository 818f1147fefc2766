//! Content capture and lexical validation helpers.

use std::sync::OnceLock;

use regex_lite::Regex;
use xylem_core::{Item, NodeTree, NodeValue, QName, Sequence};
use xylem_dom::NodeSet;
use xylem_store::Store;

use crate::error::{MutationError, MutationResult};

/// One captured content item: a detached node tree or an atomized string.
#[derive(Debug, Clone)]
pub enum ContentItem {
    Node(NodeTree),
    Atomic(String),
}

impl ContentItem {
    pub fn is_node(&self) -> bool {
        matches!(self, ContentItem::Node(_))
    }

    pub fn string_value(&self) -> String {
        match self {
            ContentItem::Node(tree) => tree.string_value(),
            ContentItem::Atomic(s) => s.clone(),
        }
    }
}

/// The captured content of one operation: every item deep-copied, so later
/// mutation of the source documents cannot reach into the payload.
#[derive(Debug, Clone, Default)]
pub struct Content {
    items: Vec<ContentItem>,
}

impl Content {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<ContentItem>) -> Self {
        Self { items }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    pub fn first(&self) -> Option<&ContentItem> {
        self.items.first()
    }

    /// String value of the first item, or the empty string.
    pub fn first_string(&self) -> String {
        self.first().map(ContentItem::string_value).unwrap_or_default()
    }

    /// Every item as a detached tree. An atomic item is a content-type
    /// error for operations that splice nodes.
    pub fn node_trees(&self) -> MutationResult<Vec<NodeTree>> {
        self.items
            .iter()
            .map(|item| match item {
                ContentItem::Node(tree) => Ok(tree.clone()),
                ContentItem::Atomic(value) => Err(MutationError::content_type(
                    "a node",
                    format!("atomic value {value:?}"),
                )),
            })
            .collect()
    }
}

/// Convert an evaluated selection into a node set of stored targets.
/// Constructed nodes and atomic values are not updatable.
pub fn node_set_from(selection: &Sequence) -> MutationResult<NodeSet> {
    let mut set = NodeSet::new();
    for item in selection {
        match item {
            Item::Node(NodeValue::Stored(id)) => {
                set.insert(id.clone());
            }
            Item::Node(NodeValue::Constructed(_)) => {
                return Err(MutationError::selection_type(
                    "selected a constructed node with no storage address",
                ));
            }
            Item::Atomic(value) => {
                return Err(MutationError::selection_type(format!(
                    "selected an atomic value {:?}",
                    value.string_value()
                )));
            }
        }
    }
    Ok(set)
}

/// Capture an evaluated content sequence as detached payloads. Stored nodes
/// are materialized out of their documents; constructed trees are cloned;
/// atomics are atomized to their string value.
pub fn capture_content(store: &Store, content: &Sequence) -> MutationResult<Content> {
    let mut items = Vec::with_capacity(content.len());
    for item in content {
        let captured = match item {
            Item::Node(NodeValue::Constructed(tree)) => ContentItem::Node(tree.clone()),
            Item::Node(NodeValue::Stored(id)) => {
                let handle = store.document(id.doc())?;
                let doc = handle.read();
                let tree = doc.materialize(id.addr()).ok_or_else(|| {
                    MutationError::invalid_selection(format!("content node {id} does not exist"))
                })?;
                ContentItem::Node(tree)
            }
            Item::Atomic(value) => ContentItem::Atomic(value.string_value()),
        };
        items.push(captured);
    }
    Ok(Content { items })
}

static NAME_RE: OnceLock<Regex> = OnceLock::new();

fn name_re() -> &'static Regex {
    NAME_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][\w.\-]*(:[A-Za-z_][\w.\-]*)?$").expect("hard-coded pattern")
    })
}

/// Lexically validate a rename target and parse it into a QName.
pub fn validate_name(name: &str) -> MutationResult<QName> {
    if name_re().is_match(name) {
        Ok(QName::parse(name))
    } else {
        Err(MutationError::content_type(
            "a lexically valid QName",
            format!("{name:?}"),
        ))
    }
}
