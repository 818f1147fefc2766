//! RENAME operation.

use xylem_core::{NodeAddr, NodeKind};
use xylem_dom::{Document, DomError};

use crate::error::{MutationError, MutationResult};
use crate::validation::{self, Content};

/// Rename an element or attribute, preserving children and value. The new
/// name is the content's string value, lexically validated. Text nodes
/// carry no name.
pub fn apply_rename(doc: &mut Document, addr: &NodeAddr, content: &Content) -> MutationResult<()> {
    let kind = doc
        .node(addr)
        .ok_or_else(|| DomError::NodeNotFound(addr.clone()))?
        .kind();
    if kind == NodeKind::Text {
        return Err(MutationError::unsupported_kind(kind));
    }
    let name = validation::validate_name(&content.first_string())?;
    doc.rename_node(addr, name)?;
    Ok(())
}
