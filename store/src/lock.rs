//! The per-document lock coordinator.
//!
//! Locks are acquired per document, in ascending document-id order, which
//! makes deadlock impossible among operations that each lock a subset of
//! the same universe in that order. Waits are bounded; a timed-out
//! acquisition releases everything it already took and leaves no lock held.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use thiserror::Error;
use tracing::trace;
use xylem_core::DocumentId;
use xylem_dom::DocumentSet;

/// Lock mode: shared for readers, exclusive for structural mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockMode {
    Shared,
    Exclusive,
}

/// Lock coordinator configuration, passed at construction.
#[derive(Debug, Clone, Copy)]
pub struct LockConfig {
    /// Bounded wait for a conflicting lock. A zero timeout turns
    /// acquisition into an immediate-or-denied attempt.
    pub timeout: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
        }
    }
}

/// Lock acquisition errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LockError {
    #[error("timed out waiting for {mode:?} lock on document {doc}")]
    Timeout { doc: DocumentId, mode: LockMode },

    #[error("{mode:?} lock on document {doc} denied: conflicting lock held")]
    Denied { doc: DocumentId, mode: LockMode },
}

#[derive(Debug, Default)]
struct LockState {
    readers: usize,
    writer: bool,
}

impl LockState {
    fn conflicts(&self, mode: LockMode) -> bool {
        match mode {
            LockMode::Shared => self.writer,
            LockMode::Exclusive => self.writer || self.readers > 0,
        }
    }

    fn grant(&mut self, mode: LockMode) {
        match mode {
            LockMode::Shared => self.readers += 1,
            LockMode::Exclusive => self.writer = true,
        }
    }

    fn revoke(&mut self, mode: LockMode) {
        match mode {
            LockMode::Shared => self.readers = self.readers.saturating_sub(1),
            LockMode::Exclusive => self.writer = false,
        }
    }
}

#[derive(Default)]
struct DocumentLock {
    state: Mutex<LockState>,
    available: Condvar,
}

/// Ownership handle for one held document lock.
#[derive(Debug)]
pub struct LockToken {
    doc: DocumentId,
    mode: LockMode,
}

impl LockToken {
    pub fn doc(&self) -> DocumentId {
        self.doc
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }
}

/// All tokens of one acquisition. Dropping the guard releases every token
/// exactly once, so unlock happens on every exit path of the owning
/// operation, including error propagation.
pub struct LockGuard<'m> {
    manager: &'m LockManager,
    tokens: Vec<LockToken>,
}

impl LockGuard<'_> {
    pub fn tokens(&self) -> &[LockToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        for token in self.tokens.drain(..) {
            self.manager.release(token);
        }
    }
}

/// Acquires and releases per-document locks.
pub struct LockManager {
    config: LockConfig,
    locks: Mutex<BTreeMap<DocumentId, Arc<DocumentLock>>>,
}

impl LockManager {
    pub fn new(config: LockConfig) -> Self {
        Self {
            config,
            locks: Mutex::new(BTreeMap::new()),
        }
    }

    /// Acquire the given mode on every document of the set, in ascending
    /// document-id order. On any failure, every token already taken in
    /// this call is released before the error propagates.
    pub fn acquire(&self, docs: &DocumentSet, mode: LockMode) -> Result<LockGuard<'_>, LockError> {
        let mut guard = LockGuard {
            manager: self,
            tokens: Vec::with_capacity(docs.len()),
        };
        for doc in docs.iter() {
            // A failure drops `guard`, releasing everything taken so far.
            let token = self.acquire_one(doc, mode)?;
            guard.tokens.push(token);
        }
        Ok(guard)
    }

    /// Count of currently held grants on a document (readers plus writer).
    /// Diagnostic; the protocol itself never polls this.
    pub fn held(&self, doc: DocumentId) -> usize {
        let locks = self.locks.lock();
        match locks.get(&doc) {
            Some(lock) => {
                let state = lock.state.lock();
                state.readers + usize::from(state.writer)
            }
            None => 0,
        }
    }

    fn acquire_one(&self, doc: DocumentId, mode: LockMode) -> Result<LockToken, LockError> {
        let lock = {
            let mut locks = self.locks.lock();
            locks.entry(doc).or_default().clone()
        };

        let mut state = lock.state.lock();
        if state.conflicts(mode) && self.config.timeout.is_zero() {
            return Err(LockError::Denied { doc, mode });
        }
        let deadline = Instant::now() + self.config.timeout;
        while state.conflicts(mode) {
            if lock.available.wait_until(&mut state, deadline).timed_out()
                && state.conflicts(mode)
            {
                return Err(LockError::Timeout { doc, mode });
            }
        }
        state.grant(mode);
        trace!(doc = %doc, ?mode, "lock acquired");
        Ok(LockToken { doc, mode })
    }

    fn release(&self, token: LockToken) {
        let lock = {
            let locks = self.locks.lock();
            locks.get(&token.doc).cloned()
        };
        if let Some(lock) = lock {
            let mut state = lock.state.lock();
            state.revoke(token.mode);
            lock.available.notify_all();
            trace!(doc = %token.doc, mode = ?token.mode, "lock released");
        }
    }
}
