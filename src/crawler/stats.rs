//! Crawl statistics aggregation
//!
//! Counters are merged under one mutex from concurrent page completions;
//! observers only ever see immutable snapshots.

use serde::Serialize;
use std::sync::Mutex;

/// Aggregate counters for one crawl
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlStats {
    /// Pages fetched and processed, successfully or not past navigation
    pub pages_visited: u64,

    /// Internal links discovered across all pages
    pub internal_links: u64,

    /// External links discovered across all pages
    pub external_links: u64,

    /// Email findings across all pages
    pub emails_found: u64,

    /// Phone findings across all pages
    pub phones_found: u64,

    /// Pages that failed (navigation errors, worker failures)
    pub errors: u64,

    /// Approximate completion percentage, clamped to [0, 100]
    pub progress: f64,
}

/// Per-page counter increments
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsDelta {
    pub pages_visited: u64,
    pub internal_links: u64,
    pub external_links: u64,
    pub emails_found: u64,
    pub phones_found: u64,
}

/// Thread-safe statistics aggregator
pub struct StatsAggregator {
    inner: Mutex<CrawlStats>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(CrawlStats::default()),
        }
    }

    /// Merges one page's counters into the aggregate
    pub fn apply(&self, delta: &StatsDelta) {
        let mut stats = self.inner.lock().unwrap();
        stats.pages_visited += delta.pages_visited;
        stats.internal_links += delta.internal_links;
        stats.external_links += delta.external_links;
        stats.emails_found += delta.emails_found;
        stats.phones_found += delta.phones_found;
    }

    /// Counts one failed page
    pub fn record_error(&self) {
        self.inner.lock().unwrap().errors += 1;
    }

    /// Recomputes progress from visited and pending counts
    ///
    /// Progress is visited / (visited + pending), expressed as a percentage.
    /// Pending counts include links that may later be dropped, so the value
    /// is an approximation of completion, not an exact fraction; it is
    /// clamped to [0, 100] and never allowed to move backwards across
    /// updates.
    pub fn set_progress(&self, visited: usize, pending_internal: usize, pending_external: usize) {
        let total = visited + pending_internal + pending_external;
        let computed = if total == 0 {
            0.0
        } else {
            (visited as f64 / total as f64) * 100.0
        };
        let clamped = computed.clamp(0.0, 100.0);

        let mut stats = self.inner.lock().unwrap();
        if clamped > stats.progress {
            stats.progress = clamped;
        }
    }

    /// Forces progress to 100, used when the frontier has fully drained
    pub fn finish_progress(&self) {
        self.inner.lock().unwrap().progress = 100.0;
    }

    /// Returns an immutable copy of the current counters
    pub fn snapshot(&self) -> CrawlStats {
        self.inner.lock().unwrap().clone()
    }

    /// Resets every counter to zero
    pub fn reset(&self) {
        *self.inner.lock().unwrap() = CrawlStats::default();
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_accumulates() {
        let stats = StatsAggregator::new();
        stats.apply(&StatsDelta {
            pages_visited: 1,
            internal_links: 3,
            external_links: 2,
            emails_found: 1,
            phones_found: 0,
        });
        stats.apply(&StatsDelta {
            pages_visited: 1,
            internal_links: 1,
            ..StatsDelta::default()
        });

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.pages_visited, 2);
        assert_eq!(snapshot.internal_links, 4);
        assert_eq!(snapshot.external_links, 2);
        assert_eq!(snapshot.emails_found, 1);
    }

    #[test]
    fn test_record_error() {
        let stats = StatsAggregator::new();
        stats.record_error();
        stats.record_error();
        assert_eq!(stats.snapshot().errors, 2);
    }

    #[test]
    fn test_progress_is_clamped_and_monotonic() {
        let stats = StatsAggregator::new();

        stats.set_progress(1, 3, 0);
        assert_eq!(stats.snapshot().progress, 25.0);

        // A burst of newly discovered links would lower the fraction; the
        // reported value must hold its ground instead.
        stats.set_progress(2, 14, 0);
        assert_eq!(stats.snapshot().progress, 25.0);

        stats.set_progress(3, 1, 0);
        assert_eq!(stats.snapshot().progress, 75.0);
    }

    #[test]
    fn test_progress_empty_crawl_is_zero() {
        let stats = StatsAggregator::new();
        stats.set_progress(0, 0, 0);
        assert_eq!(stats.snapshot().progress, 0.0);
    }

    #[test]
    fn test_finish_progress_reaches_100() {
        let stats = StatsAggregator::new();
        stats.set_progress(3, 1, 0);
        stats.finish_progress();
        assert_eq!(stats.snapshot().progress, 100.0);
    }

    #[test]
    fn test_reset_clears_counters() {
        let stats = StatsAggregator::new();
        stats.apply(&StatsDelta {
            pages_visited: 5,
            ..StatsDelta::default()
        });
        stats.record_error();
        stats.reset();
        assert_eq!(stats.snapshot(), CrawlStats::default());
    }
}
