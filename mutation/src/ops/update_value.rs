//! UPDATE VALUE operation.

use xylem_core::{NodeAddr, NodeKind};
use xylem_dom::{Document, DomError};

use crate::error::MutationResult;
use crate::validation::Content;

/// Overwrite the target's textual content with the content's string value,
/// preserving structure: an element keeps its attributes and gets a single
/// text child; text and attribute nodes change value in place.
pub fn apply_update_value(
    doc: &mut Document,
    addr: &NodeAddr,
    content: &Content,
) -> MutationResult<()> {
    let kind = doc
        .node(addr)
        .ok_or_else(|| DomError::NodeNotFound(addr.clone()))?
        .kind();
    let value = content.first_string();
    match kind {
        NodeKind::Element => doc.replace_children_with_text(addr, &value)?,
        NodeKind::Text | NodeKind::Attribute => doc.set_value(addr, value)?,
    }
    Ok(())
}
