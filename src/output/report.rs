//! JSON report generation
//!
//! The engine returns a map of page records; turning that map into a file is
//! the caller's job, and this module is that caller-side piece. The report
//! shape is `{metadata, pages}` with the internal/external split computed
//! from page authorities.

use crate::crawler::PageRecord;
use crate::url::authority;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Report header describing the crawl as a whole
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub base_url: String,
    pub total_pages: usize,
    pub total_internal_pages: usize,
    pub total_external_pages: usize,
    pub timestamp: DateTime<Utc>,
}

/// The complete persisted output of one crawl
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub metadata: ReportMetadata,
    pub pages: BTreeMap<String, PageRecord>,
}

/// Assembles a report from the records a crawl returned
pub fn build_report(base_url: &Url, pages: BTreeMap<String, PageRecord>) -> CrawlReport {
    let base_authority = authority(base_url);

    let total_internal_pages = pages
        .values()
        .filter(|record| {
            Url::parse(&record.url)
                .ok()
                .and_then(|u| authority(&u))
                .as_deref()
                == base_authority.as_deref()
        })
        .count();

    CrawlReport {
        metadata: ReportMetadata {
            base_url: base_url.to_string(),
            total_pages: pages.len(),
            total_internal_pages,
            total_external_pages: pages.len() - total_internal_pages,
            timestamp: Utc::now(),
        },
        pages,
    }
}

/// Writes a report as pretty-printed JSON
pub fn write_report(report: &CrawlReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(path, json)?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}

/// Default report filename: `data_<host>_<YYYYmmdd_HHMMSS>.json`
pub fn default_report_path(base_url: &Url) -> PathBuf {
    let host = base_url.host_str().unwrap_or("site").replace('.', "_");
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    PathBuf::from(format!("data_{}_{}.json", host, stamp))
}
