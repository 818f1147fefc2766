//! Update executor - drives the shared protocol for every operation
//! variant.
//!
//! One `execute` call walks the states
//! SELECT, VALIDATE_CONTENT, LOCK, AUTHORIZE, BEGIN_TXN, APPLY per node,
//! FRAGMENT_CHECK, COMMIT, NOTIFY, UNLOCK. Failure anywhere from LOCK
//! onward aborts the transaction; the lock guard's drop is the UNLOCK
//! state, so it runs on every exit path.

use tracing::{debug, info};
use xylem_core::{Capability, Principal};
use xylem_dom::{DocumentSet, NodeSet};
use xylem_index::ChangeKind;
use xylem_store::{LockMode, Store};
use xylem_txn::Txn;

use crate::error::{MutationError, MutationResult};
use crate::ops::{self, OpKind};
use crate::result::UpdateOutcome;
use crate::source::{ContentSource, Selector};
use crate::validation::{self, Content};

/// Executes update operations against a store on behalf of a principal.
pub struct UpdateExecutor<'s> {
    store: &'s Store,
    principal: Principal,
}

impl<'s> UpdateExecutor<'s> {
    pub fn new(store: &'s Store, principal: Principal) -> Self {
        Self { store, principal }
    }

    pub fn principal(&self) -> &Principal {
        &self.principal
    }

    /// Run one operation end to end. An empty selection is a terminal
    /// no-op: no lock is taken and no transaction begins.
    pub fn execute(
        &self,
        kind: OpKind,
        selector: &dyn Selector,
        content: &dyn ContentSource,
    ) -> MutationResult<UpdateOutcome> {
        // SELECT
        let selection = selector.select(self.store)?;
        if selection.is_empty() {
            debug!(?kind, "empty selection, nothing to update");
            return Ok(UpdateOutcome::noop());
        }
        let targets = validation::node_set_from(&selection)?;

        // VALIDATE_CONTENT
        let content = if kind.requires_content() {
            let evaluated = content.evaluate(self.store)?;
            if evaluated.is_empty() {
                return Err(MutationError::EmptyContent);
            }
            validation::capture_content(self.store, &evaluated)?
        } else {
            Content::empty()
        };

        // LOCK, then AUTHORIZE against data that can no longer change
        // under us. The guard doubles as the UNLOCK state.
        let docs = targets.document_set();
        let _guard = self.store.locks().acquire(&docs, LockMode::Exclusive)?;
        self.authorize(&docs)?;

        // BEGIN_TXN
        let mut txn = self.store.begin()?;
        match self.apply_all(&mut txn, kind, &targets, &content) {
            Ok(modified) => {
                if let Err(e) = self.fragment_check(&txn, &modified) {
                    self.store.abort(&mut txn);
                    return Err(e);
                }
                // COMMIT; a failure restores pre-images inside the store.
                self.store.commit(&mut txn)?;
                // NOTIFY strictly after commit, so subscribers re-reading
                // observe durable state.
                for doc in modified.iter() {
                    self.store.notifier().notify_update(doc, ChangeKind::Update);
                }
                info!(
                    ?kind,
                    nodes = targets.len(),
                    documents = modified.len(),
                    "update committed"
                );
                Ok(UpdateOutcome::new(targets.len(), modified))
            }
            Err(e) => {
                self.store.abort(&mut txn);
                Err(e)
            }
        }
    }

    /// Once per distinct document, after locks are held and before the
    /// transaction begins. One denial fails the whole operation.
    fn authorize(&self, docs: &DocumentSet) -> MutationResult<()> {
        for id in docs.iter() {
            let handle = self.store.document(id)?;
            let doc = handle.read();
            doc.metadata()
                .permissions()
                .require(&self.principal, Capability::Update)?;
        }
        Ok(())
    }

    /// APPLY for each target, in selection order. The listener is attached
    /// for exactly the edit window of one node and detached before any
    /// error propagates.
    fn apply_all(
        &self,
        txn: &mut Txn,
        kind: OpKind,
        targets: &NodeSet,
        content: &Content,
    ) -> MutationResult<DocumentSet> {
        let mut modified = DocumentSet::new();
        for node in targets.iter() {
            let handle = self.store.document(node.doc())?;
            let mut doc = handle.write();
            if !doc.contains(node.addr()) {
                return Err(MutationError::invalid_selection(format!(
                    "target node {node} no longer exists"
                )));
            }
            txn.snapshot(&doc);

            if let Some(listener) = self.store.index_listener() {
                doc.metadata_mut().attach_listener(listener);
            }
            let result = ops::apply(&mut doc, node.addr(), kind, content);
            doc.metadata_mut().detach_listener();
            result?;

            let stamp = self.store.next_timestamp();
            doc.metadata_mut().set_last_modified(stamp);
            self.store.persist(txn, &doc)?;
            modified.insert(node.doc());
            debug!(node = %node, ?kind, "node updated");
        }
        Ok(modified)
    }

    /// FRAGMENT_CHECK: reorganize any modified document whose churn
    /// crossed the thresholds, inside the still-open transaction.
    fn fragment_check(&self, txn: &Txn, modified: &DocumentSet) -> MutationResult<()> {
        for id in modified.iter() {
            let handle = self.store.document(id)?;
            let mut doc = handle.write();
            if self.store.auditor().should_defragment(&doc) {
                self.store.defragment(txn, &mut doc)?;
            }
        }
        Ok(())
    }
}
