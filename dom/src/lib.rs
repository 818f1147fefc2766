//! Xylem DOM
//!
//! The persisted document tree and its structural-edit primitives.
//!
//! Responsibilities:
//! - Store a document's nodes under level-order addresses
//! - Apply structural edits (insert, remove, replace, rename, set value)
//!   while pushing touched-node events to the attached index listener
//! - Track per-document metadata: permissions, last-modified timestamp,
//!   the transient listener slot, fragmentation statistics
//! - Provide NodeSet / DocumentSet, the containers selectors and locks
//!   are expressed in

mod document;
mod error;
mod node;
mod nodeset;

pub use document::{Document, FragmentationStats, Metadata};
pub use error::{DomError, DomResult};
pub use node::NodePayload;
pub use nodeset::{DocumentSet, NodeSet};
