use std::time::Duration;

use crate::error::SiseError;
use crate::partition::Plan;

/// The output of a completed search.
///
/// Matched blocks themselves go to the output stream passed to
/// [`SearchBuilder::run`](crate::SearchBuilder::run); this carries only counts
/// and worker failures.
#[derive(Debug)]
pub struct Report {
    /// Entries whose description matched.
    pub matches: usize,

    /// Entries looked at, across all workers.
    pub scanned: usize,

    /// Entries without a readable description section.
    pub skipped: usize,

    /// Workers the plan called for.
    pub workers: usize,

    /// The partitioning that was used.
    pub plan: Plan,

    /// Worker-level failures. Sibling workers ran to completion regardless.
    pub failures: Vec<SiseError>,

    pub stats: ScanStats,
}

impl Report {
    /// `true` if no worker failed. Maps to exit status zero.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Timing and resource accounting for a completed search.
#[derive(Debug, Clone, Copy)]
pub struct ScanStats {
    /// Wall-clock time from enumeration to final flush.
    pub duration: Duration,

    /// Worker scratch handles allocated.
    pub scratch_acquired: usize,

    /// Worker scratch handles released. Equal to `scratch_acquired` whenever
    /// a report is returned.
    pub scratch_released: usize,
}
