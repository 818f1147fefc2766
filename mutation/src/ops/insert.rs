//! INSERT operation.

use xylem_core::{NodeAddr, NodeKind};
use xylem_dom::{Document, DomError};

use crate::error::{MutationError, MutationResult};
use crate::ops::InsertPosition;
use crate::validation::Content;

/// Splice the content's node trees before, after, or into the target.
///
/// Sibling insertion needs a parent, so the document root rejects it;
/// into-insertion needs an element target. Attributes take part in
/// neither.
pub fn apply_insert(
    doc: &mut Document,
    addr: &NodeAddr,
    position: InsertPosition,
    content: &Content,
) -> MutationResult<()> {
    let trees = content.node_trees()?;
    let kind = doc
        .node(addr)
        .ok_or_else(|| DomError::NodeNotFound(addr.clone()))?
        .kind();

    match position {
        InsertPosition::Into => {
            if kind != NodeKind::Element {
                return Err(MutationError::unsupported_kind(kind));
            }
            for tree in &trees {
                let slot = doc.next_child_slot(addr);
                doc.insert_tree(slot, tree);
            }
        }
        InsertPosition::Before | InsertPosition::After => {
            if kind == NodeKind::Attribute {
                return Err(MutationError::unsupported_kind(kind));
            }
            let parent = doc.parent_of(addr).ok_or_else(|| {
                MutationError::invalid_selection("cannot insert siblings of the document root")
            })?;
            let at = match position {
                InsertPosition::Before => addr.position(),
                _ => addr.position() + 1,
            };
            doc.insert_siblings(&parent, at, &trees)?;
        }
    }
    Ok(())
}
