//! Report output
//!
//! Persisting results is a caller-side concern; the crawl engine itself only
//! returns the record map.

mod report;

pub use report::{build_report, default_report_path, write_report, CrawlReport, ReportMetadata};
