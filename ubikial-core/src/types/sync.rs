//! Reconciliation result types

use serde::Serialize;

/// Outcome of one reconciliation run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Local-only or locally newer records written to the remote
    pub pushed: usize,
    /// Remotely newer records copied into local storage
    pub pulled: usize,
    /// Remote-only records written into local storage
    pub imported: usize,
    /// Records with equal timestamps on both sides
    pub unchanged: usize,
}

impl SyncReport {
    /// Number of records examined.
    #[must_use]
    pub fn total(&self) -> usize {
        self.pushed + self.pulled + self.imported + self.unchanged
    }

    /// Whether any store was written.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.pushed + self.pulled + self.imported > 0
    }
}
