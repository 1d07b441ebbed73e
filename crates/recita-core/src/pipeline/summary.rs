//! Per-item outcomes and run totals.

use std::path::PathBuf;
use std::time::Duration;

use crate::catalog::Position;

/// What happened to one global index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Newly converted; `bytes` is the size of the downloaded source.
    Done { bytes: u64 },
    /// Final artifact already existed.
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ItemReport {
    pub global: u32,
    pub position: Option<Position>,
    pub final_path: Option<PathBuf>,
    pub outcome: ItemOutcome,
}

impl ItemReport {
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Failed(_))
    }
}

/// Aggregated counts, updated in completion order.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub done: usize,
    pub skipped: usize,
    pub failed: usize,
    pub bytes_fetched: u64,
    /// `(global index, reason)` for every failed item.
    pub failures: Vec<(u32, String)>,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn record(&mut self, report: &ItemReport) {
        match &report.outcome {
            ItemOutcome::Done { bytes } => {
                self.done += 1;
                self.bytes_fetched += bytes;
            }
            ItemOutcome::Skipped => self.skipped += 1,
            ItemOutcome::Failed(reason) => {
                self.failed += 1;
                self.failures.push((report.global, reason.clone()));
            }
        }
    }

    pub fn total(&self) -> usize {
        self.done + self.skipped + self.failed
    }

    /// True when no item failed.
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(global: u32, outcome: ItemOutcome) -> ItemReport {
        ItemReport {
            global,
            position: None,
            final_path: None,
            outcome,
        }
    }

    #[test]
    fn record_counts_each_outcome() {
        let mut s = RunSummary::default();
        s.record(&report(1, ItemOutcome::Done { bytes: 10 }));
        s.record(&report(2, ItemOutcome::Skipped));
        s.record(&report(3, ItemOutcome::Done { bytes: 5 }));
        assert!(s.is_success());
        s.record(&report(4, ItemOutcome::Failed("HTTP 404".into())));
        assert_eq!((s.done, s.skipped, s.failed), (2, 1, 1));
        assert_eq!(s.bytes_fetched, 15);
        assert_eq!(s.total(), 4);
        assert_eq!(s.failures, vec![(4, "HTTP 404".to_string())]);
        assert!(!s.is_success());
    }
}
