//! Xylem Core Types
//!
//! This crate provides the foundational types used throughout the xylem system:
//! - Identity types (DocumentId, NodeAddr, NodeId)
//! - Node building blocks (NodeKind, QName, detached NodeTree)
//! - Item and Sequence values exchanged with the query evaluator
//! - Principals and the document permission model

mod id;
mod node;
mod security;
mod value;

pub use id::*;
pub use node::*;
pub use security::*;
pub use value::*;
