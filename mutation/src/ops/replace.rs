//! REPLACE operation.

use xylem_core::{NodeAddr, NodeTree};
use xylem_dom::{Document, DomError, NodePayload};

use crate::error::{MutationError, MutationResult};
use crate::validation::{Content, ContentItem};

/// Replace the target node and its subtree.
///
/// An element target requires the content's first item to be node-typed
/// and must not be the document root. Text and attribute targets are
/// rebuilt from the content's string value regardless of its type.
pub fn apply_replace(doc: &mut Document, addr: &NodeAddr, content: &Content) -> MutationResult<()> {
    let payload = doc
        .node(addr)
        .ok_or_else(|| DomError::NodeNotFound(addr.clone()))?;

    match payload {
        NodePayload::Element { .. } => {
            if doc.parent_of(addr).is_none() {
                return Err(MutationError::RootReplacement(doc.id()));
            }
            let tree = match content.first() {
                Some(ContentItem::Node(tree)) => tree.clone(),
                Some(ContentItem::Atomic(value)) => {
                    return Err(MutationError::content_type(
                        "a node",
                        format!("atomic value {value:?}"),
                    ));
                }
                None => return Err(MutationError::EmptyContent),
            };
            doc.replace_subtree(addr, &tree)?;
        }
        NodePayload::Text { .. } => {
            doc.replace_subtree(addr, &NodeTree::text(content.first_string()))?;
        }
        NodePayload::Attribute { name, .. } => {
            // A replaced attribute keeps its name; only the value comes
            // from the content.
            let tree = NodeTree::Attribute {
                name: name.clone(),
                value: content.first_string(),
            };
            doc.replace_subtree(addr, &tree)?;
        }
    }
    Ok(())
}
