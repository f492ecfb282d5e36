//! The crawl engine
//!
//! This module contains the concurrent core: the frontier and visited set,
//! the per-page processor, the scheduling loop with its worker pool, the
//! pause/stop control plane, and statistics aggregation.

mod control;
mod frontier;
mod observer;
mod processor;
mod record;
mod scheduler;
mod stats;

pub use control::ControlHandle;
pub use frontier::{Discovery, Frontier, FrontierEntry};
pub use observer::{CrawlObserver, NullObserver, TracingObserver};
pub use record::PageRecord;
pub use scheduler::Crawler;
pub use stats::{CrawlStats, StatsAggregator, StatsDelta};

use crate::config::CrawlConfig;
use crate::session::{build_http_client, HttpSession};
use crate::{CrawlError, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// User agent sent by the bundled HTTP sessions
const USER_AGENT: &str = concat!("arpenteur/", env!("CARGO_PKG_VERSION"));

/// Shared state visible to the scheduling loop and every worker
pub(crate) struct CrawlContext {
    pub config: CrawlConfig,
    pub frontier: Frontier,
    pub stats: StatsAggregator,
    pub control: ControlHandle,
    pub observer: Arc<dyn CrawlObserver>,
}

/// Runs a complete crawl with plain-HTTP sessions
///
/// This is the batteries-included entry point: it builds `pool_size` HTTP
/// sessions over one shared client, runs the crawl to completion, and
/// returns the records keyed by page key. Callers that need pause/stop
/// control or a custom session type construct a [`Crawler`] directly.
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(map)` - Every page record produced, keyed by page key
/// * `Err(CrawlError)` - Invalid configuration; no crawl was started
pub async fn run_crawl(config: CrawlConfig) -> Result<BTreeMap<String, PageRecord>> {
    let client = build_http_client(USER_AGENT).map_err(CrawlError::Http)?;
    let sessions = (0..config.pool_size)
        .map(|_| HttpSession::new(client.clone()))
        .collect();

    let crawler = Crawler::new(config, sessions, Arc::new(TracingObserver))?;
    Ok(crawler.run().await)
}
