//! Update operation implementations.
//!
//! Each variant (REPLACE, INSERT, DELETE, RENAME, UPDATE VALUE) lives in
//! its own module; all dispatch on the target node's kind.

mod delete;
mod insert;
mod rename;
mod replace;
mod update_value;

pub use delete::apply_delete;
pub use insert::apply_insert;
pub use rename::apply_rename;
pub use replace::apply_replace;
pub use update_value::apply_update_value;

use xylem_core::NodeAddr;
use xylem_dom::Document;

use crate::error::MutationResult;
use crate::validation::Content;

/// Where INSERT splices its content relative to the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
    Into,
}

/// The operation variants sharing one protocol driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Replace,
    Insert(InsertPosition),
    Delete,
    Rename,
    UpdateValue,
}

impl OpKind {
    /// Delete is the only variant that runs without content.
    pub fn requires_content(&self) -> bool {
        !matches!(self, OpKind::Delete)
    }
}

/// Apply one variant to one target node. The caller owns the protocol
/// around this call (snapshot, listener window, persistence).
pub fn apply(
    doc: &mut Document,
    addr: &NodeAddr,
    kind: OpKind,
    content: &Content,
) -> MutationResult<()> {
    match kind {
        OpKind::Replace => apply_replace(doc, addr, content),
        OpKind::Insert(position) => apply_insert(doc, addr, position, content),
        OpKind::Delete => apply_delete(doc, addr),
        OpKind::Rename => apply_rename(doc, addr, content),
        OpKind::UpdateValue => apply_update_value(doc, addr, content),
    }
}
