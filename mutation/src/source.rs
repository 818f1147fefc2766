//! The query-evaluator seam.
//!
//! The engine consumes selections and content as already-evaluated
//! sequences; parsing and optimizing the query language happens upstream.
//! Closures implement both traits, which is what the tests inject.

use xylem_core::{Item, Sequence};
use xylem_dom::NodeSet;
use xylem_store::Store;

use crate::error::MutationResult;

/// Evaluates the target selector against the store.
pub trait Selector {
    fn select(&self, store: &Store) -> MutationResult<Sequence>;
}

impl<F> Selector for F
where
    F: Fn(&Store) -> MutationResult<Sequence>,
{
    fn select(&self, store: &Store) -> MutationResult<Sequence> {
        self(store)
    }
}

/// Evaluates the content expression against the store.
pub trait ContentSource {
    fn evaluate(&self, store: &Store) -> MutationResult<Sequence>;
}

impl<F> ContentSource for F
where
    F: Fn(&Store) -> MutationResult<Sequence>,
{
    fn evaluate(&self, store: &Store) -> MutationResult<Sequence> {
        self(store)
    }
}

/// A fixed, pre-resolved node selection.
#[derive(Debug, Clone)]
pub struct NodeSetSelector(pub NodeSet);

impl Selector for NodeSetSelector {
    fn select(&self, _store: &Store) -> MutationResult<Sequence> {
        Ok(self.0.iter().cloned().map(Item::stored).collect())
    }
}

/// A fixed, pre-evaluated content sequence.
#[derive(Debug, Clone)]
pub struct SequenceContent(pub Sequence);

impl ContentSource for SequenceContent {
    fn evaluate(&self, _store: &Store) -> MutationResult<Sequence> {
        Ok(self.0.clone())
    }
}

impl ContentSource for Sequence {
    fn evaluate(&self, _store: &Store) -> MutationResult<Sequence> {
        Ok(self.clone())
    }
}
