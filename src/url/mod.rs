//! URL canonicalization and classification
//!
//! Canonical URLs are the deduplication key for the whole crawl: the frontier,
//! the visited set, and page keys all operate on the canonical form.

mod canonical;
mod classify;

pub use canonical::{canonicalize, is_fetchable, page_key};
pub use classify::{authority, classify, LinkScope};
