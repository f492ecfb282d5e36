//! Per-page crawl results

use crate::extract::{ExtractedItem, SensitiveFindings, StructureDescriptor};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything produced by processing one page
///
/// Records are keyed by the page key of their canonical URL and are
/// write-once: the visited-set gate dispatches each canonical URL at most
/// once, so no two workers can ever produce records for the same key.
#[derive(Debug, Clone, Serialize)]
pub struct PageRecord {
    /// Canonical URL of the page
    pub url: String,

    /// Repeating structures detected on the page
    pub structures: Vec<StructureDescriptor>,

    /// Items extracted from the detected structures
    pub items: Vec<ExtractedItem>,

    /// Sensitive-data findings
    pub sensitive_data: SensitiveFindings,

    /// Internal links found on the page (canonical, deduplicated)
    pub internal_links: Vec<String>,

    /// External links found on the page (canonical, deduplicated)
    pub external_links: Vec<String>,

    /// Link depth from the seed
    pub depth: u32,

    /// When the page was processed
    pub timestamp: DateTime<Utc>,
}
