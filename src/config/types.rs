use serde::Deserialize;
use std::time::Duration;

/// Runtime configuration for one crawl
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Seed URL the exploration starts from
    pub seed_url: String,

    /// Maximum number of pages to fetch across the whole crawl
    pub max_pages: usize,

    /// Maximum link depth from the seed (the seed itself is depth 0)
    pub max_depth: u32,

    /// Number of concurrent workers processing pages
    pub max_workers: usize,

    /// Number of fetch sessions in the resource pool
    pub pool_size: usize,

    /// Whether links leaving the seed's authority are explored too
    pub explore_external: bool,

    /// Settle delay applied after each navigation, before reading content
    pub page_delay: Duration,

    /// Upper bound on the dynamic-content wait per page
    pub settle_timeout: Duration,
}

impl CrawlConfig {
    /// Creates a configuration with default bounds for the given seed
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            ..Self::default()
        }
    }

    /// Applies a TOML profile underneath the current values
    ///
    /// Only fields present in the profile are overwritten. The seed URL never
    /// comes from a profile.
    pub fn apply_profile(&mut self, profile: &CrawlProfile) {
        if let Some(v) = profile.max_pages {
            self.max_pages = v;
        }
        if let Some(v) = profile.max_depth {
            self.max_depth = v;
        }
        if let Some(v) = profile.max_workers {
            self.max_workers = v;
        }
        if let Some(v) = profile.pool_size {
            self.pool_size = v;
        }
        if let Some(v) = profile.explore_external {
            self.explore_external = v;
        }
        if let Some(v) = profile.page_delay_ms {
            self.page_delay = Duration::from_millis(v);
        }
        if let Some(v) = profile.settle_timeout_ms {
            self.settle_timeout = Duration::from_millis(v);
        }
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: String::new(),
            max_pages: 50,
            max_depth: 2,
            max_workers: 5,
            pool_size: 5,
            explore_external: false,
            page_delay: Duration::from_secs(2),
            settle_timeout: Duration::from_secs(10),
        }
    }
}

/// Optional TOML profile with partial overrides
///
/// Every field is optional so a profile can pin just the knobs it cares
/// about.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlProfile {
    /// Maximum number of pages to fetch
    #[serde(rename = "max-pages")]
    pub max_pages: Option<usize>,

    /// Maximum link depth from the seed
    #[serde(rename = "max-depth")]
    pub max_depth: Option<u32>,

    /// Number of concurrent workers
    #[serde(rename = "max-workers")]
    pub max_workers: Option<usize>,

    /// Number of sessions in the fetch pool
    #[serde(rename = "pool-size")]
    pub pool_size: Option<usize>,

    /// Whether to explore external links
    #[serde(rename = "explore-external")]
    pub explore_external: Option<bool>,

    /// Post-navigation settle delay (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: Option<u64>,

    /// Dynamic-content wait bound (milliseconds)
    #[serde(rename = "settle-timeout-ms")]
    pub settle_timeout_ms: Option<u64>,
}
