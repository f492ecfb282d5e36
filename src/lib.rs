//! Arpenteur: a concurrent site mapper and data extractor
//!
//! This crate explores a web site from a seed URL, following internal and
//! (optionally) external links up to depth and page-count bounds, and extracts
//! structured items and sensitive findings from every visited page. The crawl
//! engine coordinates a bounded worker pool over a fixed pool of fetch
//! sessions, with pause/stop control and live statistics.

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod session;
pub mod url;

use thiserror::Error;

/// Main error type for arpenteur operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Report serialization error: {0}")]
    Report(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// All of these are fatal at crawl start: a crawl with an invalid
/// configuration never begins.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read profile file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    InvalidScheme(String),

    #[error("URL has no host")]
    MissingHost,
}

/// Errors produced at the fetch-session boundary
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Navigation failed for {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timed out while loading {url}")]
    Timeout { url: String },

    #[error("No page has been loaded in this session")]
    NoPage,

    #[error("Invalid selector: {0}")]
    Selector(String),

    #[error("Session pool is closed")]
    PoolClosed,

    #[error("Crawl cancelled")]
    Cancelled,
}

/// Result type alias for arpenteur operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{
    run_crawl, ControlHandle, CrawlObserver, CrawlStats, Crawler, NullObserver, PageRecord,
};
pub use session::{HttpSession, PageSession, SessionPool};
pub use crate::url::{authority, canonicalize, page_key, LinkScope};
