//! Xylem Store
//!
//! The shared document store and its coordination services.
//!
//! Responsibilities:
//! - Keep the registry of stored documents (id- and path-keyed)
//! - Coordinate per-document shared/exclusive locks in a deadlock-free
//!   acquisition order
//! - Audit physical fragmentation after edits and reorganize when the
//!   thresholds trip
//! - Fan post-commit update events out to subscribers
//! - Drive the transaction manager (begin/persist/commit/abort) and
//!   restore pre-images when an operation fails

mod defrag;
mod error;
mod lock;
mod notify;
mod store;

pub use defrag::{DefragConfig, FragmentationAuditor};
pub use error::{StoreError, StoreResult};
pub use lock::{LockConfig, LockError, LockGuard, LockManager, LockMode, LockToken};
pub use notify::{NotificationService, UpdateSubscriber};
pub use store::{Store, StoreConfig};
