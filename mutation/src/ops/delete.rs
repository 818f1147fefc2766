//! DELETE operation.

use xylem_core::NodeAddr;
use xylem_dom::Document;

use crate::error::{MutationError, MutationResult};

/// Remove the target node with its whole subtree. The document root stays;
/// a document with no root element is not a state this engine produces.
pub fn apply_delete(doc: &mut Document, addr: &NodeAddr) -> MutationResult<()> {
    if doc.parent_of(addr).is_none() {
        return Err(MutationError::invalid_selection(
            "cannot delete the document root",
        ));
    }
    doc.remove_subtree(addr)?;
    Ok(())
}
