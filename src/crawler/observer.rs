//! Observer seam between the engine and the surrounding application

use crate::crawler::CrawlStats;

/// Receives log lines and statistics snapshots from a running crawl
///
/// Injected at crawl construction; the engine holds it behind an `Arc` and
/// calls it from worker tasks, so implementations must be cheap and must not
/// block.
pub trait CrawlObserver: Send + Sync {
    /// Called with a human-readable progress message
    fn on_log(&self, _message: &str) {}

    /// Called with a fresh snapshot after every page completion or failure
    fn on_stats(&self, _snapshot: &CrawlStats) {}
}

/// Observer that ignores everything
pub struct NullObserver;

impl CrawlObserver for NullObserver {}

/// Observer that forwards to the tracing subscriber
pub struct TracingObserver;

impl CrawlObserver for TracingObserver {
    fn on_log(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn on_stats(&self, snapshot: &CrawlStats) {
        tracing::debug!(
            "visited={} errors={} progress={:.1}%",
            snapshot.pages_visited,
            snapshot.errors,
            snapshot.progress
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingObserver {
        logs: Mutex<Vec<String>>,
        snapshots: Mutex<Vec<CrawlStats>>,
    }

    impl CrawlObserver for RecordingObserver {
        fn on_log(&self, message: &str) {
            self.logs.lock().unwrap().push(message.to_string());
        }

        fn on_stats(&self, snapshot: &CrawlStats) {
            self.snapshots.lock().unwrap().push(snapshot.clone());
        }
    }

    #[test]
    fn test_custom_observer_receives_calls() {
        let observer = RecordingObserver {
            logs: Mutex::new(Vec::new()),
            snapshots: Mutex::new(Vec::new()),
        };

        observer.on_log("exploring https://example.com/");
        observer.on_stats(&CrawlStats {
            pages_visited: 1,
            ..CrawlStats::default()
        });

        assert_eq!(observer.logs.lock().unwrap().len(), 1);
        assert_eq!(observer.snapshots.lock().unwrap()[0].pages_visited, 1);
    }

    #[test]
    fn test_null_observer_is_silent() {
        let observer = NullObserver;
        observer.on_log("ignored");
        observer.on_stats(&CrawlStats::default());
    }
}
