//! Ingest run summary

use serde::Serialize;

/// A category whose traversal failed, with the error that stopped it
#[derive(Debug, Clone, Serialize)]
pub struct FailedCategory {
    pub category: String,
    pub error: String,
}

/// Summary of one ingest run
///
/// Built incrementally while the run progresses; immutable once returned.
/// Partial failures are data here, not errors: a run that lost categories
/// still produces a report.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Number of categories discovered on the landing page
    pub discovered: usize,

    /// Rows newly inserted into the store
    pub inserted: usize,

    /// Records suppressed as duplicates, within the run or by the store
    pub skipped_duplicate: usize,

    /// Item blocks that failed field extraction and were skipped
    pub extract_failures: usize,

    /// Categories that terminated early, in discovery order
    pub failed_categories: Vec<FailedCategory>,
}

impl IngestReport {
    /// Total records the run extracted, counting duplicates
    pub fn total_extracted(&self) -> usize {
        self.inserted + self.skipped_duplicate
    }
}
