//! Crawl scheduling loop and worker pool
//!
//! One [`Crawler`] owns the session pool, the frontier, and a single
//! scheduling loop over a `JoinSet` of worker tasks. The loop is the only
//! writer of the in-flight count: it fills free worker slots from the
//! frontier (internal queue first), then suspends on the next completion
//! instead of spinning. Per-task failures are counted and isolated; only an
//! explicit stop or frontier exhaustion with nothing in flight ends the
//! crawl.

use crate::config::{self, CrawlConfig};
use crate::crawler::processor::process_page;
use crate::crawler::{
    ControlHandle, CrawlContext, CrawlObserver, CrawlStats, Frontier, FrontierEntry, PageRecord,
    StatsAggregator,
};
use crate::session::{PageSession, SessionPool};
use crate::url::{canonicalize, page_key};
use crate::{ConfigError, CrawlError, SessionError};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// The crawl engine
///
/// Construction validates the configuration; [`Crawler::run`] then drives
/// the crawl to completion and returns every record produced, keyed by page
/// key. A `Crawler` is single-use: the visited set survives `run`, so a
/// second call finds the seed already visited and returns immediately.
pub struct Crawler<S: PageSession + 'static> {
    ctx: Arc<CrawlContext>,
    pool: Arc<SessionPool<S>>,
    seed: Url,
}

impl<S: PageSession + 'static> Crawler<S> {
    /// Creates a crawler over the given sessions
    ///
    /// # Arguments
    ///
    /// * `config` - Crawl bounds and timings; validated here
    /// * `sessions` - The fetch sessions forming the resource pool
    /// * `observer` - Receives log lines and stats snapshots
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Ready to run
    /// * `Err(CrawlError)` - Invalid configuration or seed URL; the crawl
    ///   never starts
    pub fn new(
        config: CrawlConfig,
        sessions: Vec<S>,
        observer: Arc<dyn CrawlObserver>,
    ) -> Result<Self, CrawlError> {
        config::validate(&config)?;

        if sessions.is_empty() {
            return Err(ConfigError::Validation(
                "session pool cannot be empty".to_string(),
            )
            .into());
        }

        let seed = canonicalize(&config.seed_url)?;
        let frontier = Frontier::new(&seed, config.max_depth, config.explore_external)?;
        let pool = SessionPool::new(sessions);

        Ok(Self {
            ctx: Arc::new(CrawlContext {
                config,
                frontier,
                stats: StatsAggregator::new(),
                control: ControlHandle::new(),
                observer,
            }),
            pool,
            seed,
        })
    }

    /// Returns a control handle for pausing, resuming, and stopping
    ///
    /// The handle is cheap to clone and safe to use from any thread.
    pub fn control(&self) -> ControlHandle {
        self.ctx.control.clone()
    }

    /// Returns a snapshot of the current statistics
    pub fn stats(&self) -> CrawlStats {
        self.ctx.stats.snapshot()
    }

    /// Runs the crawl to completion
    ///
    /// Blocks the caller until the frontier is exhausted with nothing in
    /// flight, the page cap is reached, or a stop is requested; in every
    /// case the records produced so far are returned. In-flight work is
    /// drained, never abandoned, and the session pool is closed on the way
    /// out.
    pub async fn run(&self) -> BTreeMap<String, PageRecord> {
        let mut records = BTreeMap::new();
        let mut join_set: JoinSet<(Url, Result<PageRecord, SessionError>)> = JoinSet::new();
        let mut dispatched = 0usize;

        self.ctx.frontier.discover(&self.seed, 0);
        tracing::info!(
            "Starting crawl of {} (max {} pages, depth {}, {} workers)",
            self.seed,
            self.ctx.config.max_pages,
            self.ctx.config.max_depth,
            self.ctx.config.max_workers
        );

        loop {
            if self.ctx.control.should_stop() {
                break;
            }

            // Workers already dispatched keep running while paused; only
            // submission of new work is suspended.
            self.ctx.control.wait_while_paused().await;
            if self.ctx.control.should_stop() {
                break;
            }

            while join_set.len() < self.ctx.config.max_workers
                && dispatched < self.ctx.config.max_pages
            {
                let Some(entry) = self.next_entry() else {
                    break;
                };
                dispatched += 1;
                self.spawn_worker(&mut join_set, entry);
            }

            if join_set.is_empty() {
                // Nothing running and nothing dispatchable: the crawl is
                // complete (or capped).
                break;
            }

            if let Some(joined) = join_set.join_next().await {
                self.reap(joined, &mut records);
            }
        }

        // Draining: no new work, but in-flight pages finish (or cancel
        // themselves cooperatively at their next stop checkpoint).
        while let Some(joined) = join_set.join_next().await {
            self.reap(joined, &mut records);
        }

        self.pool.close();

        if !self.ctx.control.should_stop() && self.ctx.frontier.is_empty() {
            self.ctx.stats.finish_progress();
            self.ctx.observer.on_stats(&self.ctx.stats.snapshot());
        }

        let stats = self.ctx.stats.snapshot();
        tracing::info!(
            "Crawl finished: {} records, {} errors, {} links seen",
            records.len(),
            stats.errors,
            stats.internal_links + stats.external_links
        );

        records
    }

    /// Pops the next dispatchable entry, internal queue first
    fn next_entry(&self) -> Option<FrontierEntry> {
        if self.ctx.control.should_stop() {
            return None;
        }
        self.ctx.frontier.next_internal().or_else(|| {
            if self.ctx.config.explore_external {
                self.ctx.frontier.next_external()
            } else {
                None
            }
        })
    }

    fn spawn_worker(
        &self,
        join_set: &mut JoinSet<(Url, Result<PageRecord, SessionError>)>,
        entry: FrontierEntry,
    ) {
        let pool = Arc::clone(&self.pool);
        let ctx = Arc::clone(&self.ctx);
        join_set.spawn(async move {
            let url = entry.url.clone();
            let result = match pool.acquire().await {
                Ok(mut session) => {
                    process_page(&mut *session, &entry.url, entry.depth, &ctx).await
                }
                Err(e) => Err(e),
            };
            (url, result)
        });
    }

    /// Folds one completed worker into records and stats
    fn reap(
        &self,
        joined: Result<(Url, Result<PageRecord, SessionError>), tokio::task::JoinError>,
        records: &mut BTreeMap<String, PageRecord>,
    ) {
        match joined {
            Ok((url, Ok(record))) => {
                records.insert(page_key(&url), record);
            }
            Ok((url, Err(SessionError::Cancelled))) => {
                tracing::debug!("Processing of {} cancelled by stop", url);
            }
            Ok((url, Err(SessionError::PoolClosed))) => {
                tracing::debug!("Pool closed before {} could be processed", url);
            }
            Ok((url, Err(e))) => {
                tracing::warn!("Failed to process {}: {}", url, e);
                self.record_failure();
            }
            Err(e) => {
                tracing::error!("Worker task failed: {}", e);
                self.record_failure();
            }
        }
    }

    fn record_failure(&self) {
        self.ctx.stats.record_error();
        self.ctx.stats.set_progress(
            self.ctx.frontier.visited_count(),
            self.ctx.frontier.pending_internal(),
            self.ctx.frontier.pending_external(),
        );
        self.ctx.observer.on_stats(&self.ctx.stats.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::NullObserver;
    use crate::session::{ExtractOpts, Extracted};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::time::Duration;

    struct StaticSession {
        pages: HashMap<String, String>,
        current: Option<String>,
    }

    impl StaticSession {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, b)| (u.to_string(), b.to_string()))
                    .collect(),
                current: None,
            }
        }
    }

    #[async_trait]
    impl PageSession for StaticSession {
        async fn navigate(&mut self, url: &Url) -> Result<(), SessionError> {
            match self.pages.get(url.as_str()) {
                Some(body) => {
                    self.current = Some(body.clone());
                    Ok(())
                }
                None => Err(SessionError::Navigation {
                    url: url.to_string(),
                    reason: "no such page".to_string(),
                }),
            }
        }

        async fn rendered_content(&self) -> Result<String, SessionError> {
            self.current.clone().ok_or(SessionError::NoPage)
        }

        async fn reveal_hidden(&mut self) -> Result<(), SessionError> {
            Ok(())
        }

        async fn expand_all(&mut self) -> Result<(), SessionError> {
            Ok(())
        }

        async fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
            Ok(())
        }

        async fn wait_for_dynamic_content(
            &mut self,
            _timeout: Duration,
        ) -> Result<(), SessionError> {
            Ok(())
        }

        async fn extract(
            &self,
            _selector: &str,
            _opts: &ExtractOpts,
        ) -> Result<Extracted, SessionError> {
            Ok(Extracted::Single(None))
        }
    }

    fn fast_config(seed: &str) -> CrawlConfig {
        let mut config = CrawlConfig::new(seed);
        config.page_delay = Duration::ZERO;
        config
    }

    #[tokio::test]
    async fn test_single_page_crawl() {
        let config = fast_config("https://example.com/");
        let sessions = vec![StaticSession::new(&[(
            "https://example.com/",
            "<html><body>no links</body></html>",
        )])];
        let crawler = Crawler::new(config, sessions, Arc::new(NullObserver)).unwrap();

        let records = crawler.run().await;

        assert_eq!(records.len(), 1);
        let stats = crawler.stats();
        assert_eq!(stats.pages_visited, 1);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.progress, 100.0);
    }

    #[tokio::test]
    async fn test_rejects_invalid_seed() {
        let config = fast_config("not a url");
        let result = Crawler::new(config, vec![StaticSession::new(&[])], Arc::new(NullObserver));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_rejects_empty_session_pool() {
        let config = fast_config("https://example.com/");
        let sessions: Vec<StaticSession> = Vec::new();
        let result = Crawler::new(config, sessions, Arc::new(NullObserver));
        assert!(matches!(
            result,
            Err(CrawlError::Config(ConfigError::Validation(_)))
        ));
    }

    #[tokio::test]
    async fn test_rejects_zero_pages() {
        let mut config = fast_config("https://example.com/");
        config.max_pages = 0;
        let result = Crawler::new(config, vec![StaticSession::new(&[])], Arc::new(NullObserver));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_failing_seed_counts_one_error() {
        let config = fast_config("https://example.com/");
        // Session knows no pages at all, so the seed navigation fails
        let sessions = vec![StaticSession::new(&[])];
        let crawler = Crawler::new(config, sessions, Arc::new(NullObserver)).unwrap();

        let records = crawler.run().await;

        assert!(records.is_empty());
        assert_eq!(crawler.stats().errors, 1);
    }
}
