//! Crawl configuration
//!
//! Configuration comes from CLI flags, optionally layered over a TOML
//! profile, and is validated once before the crawl starts.

mod parser;
mod types;
mod validation;

pub use parser::load_profile;
pub use types::{CrawlConfig, CrawlProfile};
pub use validation::validate;
