//! Pure extraction functions over rendered markup
//!
//! Everything in this module is a pure function from markup (and text) to
//! data: link discovery, repeating-structure detection with per-field
//! selectors, and sensitive-data scanning. The crawl engine treats these as
//! black boxes; nothing here touches shared state.

pub mod links;
pub mod sensitive;
pub mod structure;

use scraper::Html;

pub use links::discover_links;
pub use sensitive::{extract_all, SensitiveFindings};
pub use structure::{detect_structures, extract_items, ExtractedItem, StructureDescriptor};

/// Collapses a document to its visible text content
pub fn page_text(markup: &str) -> String {
    let document = Html::parse_document(markup);
    document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ")
}
