//! Plain-HTTP implementation of the session boundary
//!
//! `HttpSession` fetches pages with reqwest and serves the response body as
//! the rendered content. The settle operations are no-ops: static markup has
//! nothing to reveal, expand, or scroll. Sites that need real script
//! execution get a different `PageSession` implementation; the crawl engine
//! does not care which one it is driving.

use crate::session::{ExtractOpts, Extracted, PageSession};
use crate::SessionError;
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// Builds the HTTP client shared by the pool's sessions
///
/// # Arguments
///
/// * `user_agent` - The User-Agent header value sent with every request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.to_string())
        .timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// A loaded page held by an [`HttpSession`]
#[derive(Debug, Clone)]
struct LoadedPage {
    url: Url,
    body: String,
}

/// Fetch session backed by a plain HTTP client
pub struct HttpSession {
    client: Client,
    current: Option<LoadedPage>,
}

impl HttpSession {
    /// Creates a session using the given client
    ///
    /// Clients are cheap to clone; a whole pool of sessions normally shares
    /// one underlying client and its connection pool.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            current: None,
        }
    }

    fn current(&self) -> Result<&LoadedPage, SessionError> {
        self.current.as_ref().ok_or(SessionError::NoPage)
    }
}

#[async_trait]
impl PageSession for HttpSession {
    async fn navigate(&mut self, url: &Url) -> Result<(), SessionError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                reason: format!("HTTP {}", status.as_u16()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| SessionError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        self.current = Some(LoadedPage {
            url: url.clone(),
            body,
        });
        Ok(())
    }

    async fn rendered_content(&self) -> Result<String, SessionError> {
        Ok(self.current()?.body.clone())
    }

    async fn reveal_hidden(&mut self) -> Result<(), SessionError> {
        // Nothing is hidden behind CSS in a static fetch.
        Ok(())
    }

    async fn expand_all(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn scroll_to_bottom(&mut self) -> Result<(), SessionError> {
        Ok(())
    }

    async fn wait_for_dynamic_content(&mut self, _timeout: Duration) -> Result<(), SessionError> {
        // Static content is already settled once the body has arrived.
        Ok(())
    }

    async fn extract(&self, selector: &str, opts: &ExtractOpts) -> Result<Extracted, SessionError> {
        let page = self.current()?;
        let parsed =
            Selector::parse(selector).map_err(|_| SessionError::Selector(selector.to_string()))?;
        let document = Html::parse_document(&page.body);

        let value_of = |element: scraper::ElementRef<'_>| -> Option<String> {
            match &opts.attribute {
                Some(attr) => element.value().attr(attr).map(|v| v.to_string()),
                None => Some(element.text().collect::<String>().trim().to_string()),
            }
        };

        if opts.multiple {
            let values = document
                .select(&parsed)
                .filter_map(value_of)
                .collect::<Vec<_>>();
            Ok(Extracted::Multiple(values))
        } else {
            Ok(Extracted::Single(
                document.select(&parsed).next().and_then(value_of),
            ))
        }
    }
}

fn classify_request_error(url: &Url, error: &reqwest::Error) -> SessionError {
    if error.is_timeout() {
        SessionError::Timeout {
            url: url.to_string(),
        }
    } else {
        SessionError::Navigation {
            url: url.to_string(),
            reason: error.to_string(),
        }
    }
}
