//! Fetch sessions and the session resource pool
//!
//! A [`PageSession`] is one reusable fetch-and-render resource: it can
//! navigate to a URL, hand back the rendered markup, run best-effort
//! page-settling operations, and extract values by CSS selector. The crawl
//! engine only ever talks to this trait; the bundled [`HttpSession`] is a
//! plain-HTTP implementation, and tests drive the engine with scripted
//! sessions.

mod http;
mod pool;

use crate::SessionError;
use async_trait::async_trait;
use std::time::Duration;
use url::Url;

pub use http::{build_http_client, HttpSession};
pub use pool::{PooledSession, SessionPool};

/// Options for selector-based extraction
#[derive(Debug, Clone, Default)]
pub struct ExtractOpts {
    /// Extract every match instead of the first one
    pub multiple: bool,

    /// Extract this attribute's value instead of the element text
    pub attribute: Option<String>,
}

/// Result of a selector-based extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extracted {
    /// First match, or `None` when nothing matched
    Single(Option<String>),
    /// Every match, possibly empty
    Multiple(Vec<String>),
}

/// One reusable fetch-and-render resource
///
/// Sessions are owned exclusively by one worker at a time, live in a
/// [`SessionPool`] between uses, and are reused across many fetches. The
/// settle operations (`reveal_hidden`, `expand_all`, `scroll_to_bottom`,
/// `wait_for_dynamic_content`) are best-effort: callers log their failures
/// and carry on with the page.
#[async_trait]
pub trait PageSession: Send {
    /// Loads the given URL, replacing whatever page was loaded before
    async fn navigate(&mut self, url: &Url) -> Result<(), SessionError>;

    /// Returns the rendered markup of the current page
    async fn rendered_content(&self) -> Result<String, SessionError>;

    /// Forces hidden elements visible
    async fn reveal_hidden(&mut self) -> Result<(), SessionError>;

    /// Expands collapsed sections
    async fn expand_all(&mut self) -> Result<(), SessionError>;

    /// Scrolls to the bottom of the page to trigger lazy loading
    async fn scroll_to_bottom(&mut self) -> Result<(), SessionError>;

    /// Waits for in-flight dynamic content, up to `timeout`
    async fn wait_for_dynamic_content(&mut self, timeout: Duration) -> Result<(), SessionError>;

    /// Extracts text or an attribute from the current page by CSS selector
    async fn extract(&self, selector: &str, opts: &ExtractOpts) -> Result<Extracted, SessionError>;
}
