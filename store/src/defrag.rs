//! The fragmentation auditor.
//!
//! A heuristic gate, not a correctness mechanism: skipping reorganization
//! never violates integrity, it only lets read-path cost grow.

use xylem_dom::Document;

/// Thresholds for deciding a document needs physical reorganization.
#[derive(Debug, Clone, Copy)]
pub struct DefragConfig {
    /// Structural edits tolerated since the last reorganization.
    pub edit_threshold: u64,
    /// Nodes re-addressed by sibling shifts tolerated since the last
    /// reorganization.
    pub displaced_threshold: u64,
}

impl Default for DefragConfig {
    fn default() -> Self {
        Self {
            edit_threshold: 50,
            displaced_threshold: 200,
        }
    }
}

/// Post-edit check over a document's accumulated structural churn.
pub struct FragmentationAuditor {
    config: DefragConfig,
}

impl FragmentationAuditor {
    pub fn new(config: DefragConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DefragConfig {
        &self.config
    }

    /// True if the document's churn since its last reorganization crossed
    /// either threshold.
    pub fn should_defragment(&self, doc: &Document) -> bool {
        let stats = doc.metadata().fragmentation();
        stats.edits() >= self.config.edit_threshold
            || stats.displaced() >= self.config.displaced_threshold
    }
}
