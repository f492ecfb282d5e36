//! Per-page processing pipeline
//!
//! One invocation of [`process_page`] drives a borrowed session through
//! fetch, settle, extraction, and link discovery for a single URL. Steps 1-5
//! touch only the session; link discovery and the stats push at the end are
//! the only writes to shared state.

use crate::crawler::stats::StatsDelta;
use crate::crawler::{CrawlContext, PageRecord};
use crate::extract;
use crate::session::PageSession;
use crate::url::{canonicalize, classify, LinkScope};
use crate::SessionError;
use chrono::Utc;
use std::collections::BTreeSet;
use url::Url;

/// Processes one page through a borrowed session
///
/// On success the discovered links have been fed to the frontier, the stats
/// reflect the page, and the returned record is complete. A navigation
/// failure produces no partial record and no frontier or stats mutation
/// other than the error counting done by the caller. The settle operations
/// are best-effort: their failures are logged and the page continues.
///
/// Cancellation is cooperative: the stop flag is checked before navigation
/// and the settle delay is cut short by it, surfacing as
/// `SessionError::Cancelled`.
pub(crate) async fn process_page<S: PageSession>(
    session: &mut S,
    url: &Url,
    depth: u32,
    ctx: &CrawlContext,
) -> Result<PageRecord, SessionError> {
    if ctx.control.should_stop() {
        return Err(SessionError::Cancelled);
    }

    ctx.observer
        .on_log(&format!("Exploring {} (depth {})", url, depth));

    session.navigate(url).await?;

    // Settle delay between requests; load politeness, not a correctness wait.
    if !ctx.control.sleep_unless_stopped(ctx.config.page_delay).await {
        return Err(SessionError::Cancelled);
    }

    if let Err(e) = session.reveal_hidden().await {
        tracing::debug!("reveal_hidden failed for {}: {}", url, e);
    }
    if let Err(e) = session.expand_all().await {
        tracing::debug!("expand_all failed for {}: {}", url, e);
    }
    if let Err(e) = session.scroll_to_bottom().await {
        tracing::debug!("scroll_to_bottom failed for {}: {}", url, e);
    }
    if let Err(e) = session
        .wait_for_dynamic_content(ctx.config.settle_timeout)
        .await
    {
        tracing::debug!("wait_for_dynamic_content gave up for {}: {}", url, e);
    }

    // Re-read after the settle operations may have mutated the page.
    let markup = session.rendered_content().await?;
    let text = extract::page_text(&markup);

    let structures = extract::detect_structures(&markup);
    let items = extract::extract_items(&markup, url, &structures);
    let sensitive_data = extract::extract_all(&text, &markup);

    let (internal, external) = discover_page_links(&markup, url, ctx);
    for target in internal.iter().chain(external.iter()) {
        ctx.frontier.discover(target, depth + 1);
    }

    ctx.stats.apply(&StatsDelta {
        pages_visited: 1,
        internal_links: internal.len() as u64,
        external_links: external.len() as u64,
        emails_found: sensitive_data.emails.len() as u64,
        phones_found: sensitive_data.phones.len() as u64,
    });
    ctx.stats.set_progress(
        ctx.frontier.visited_count(),
        ctx.frontier.pending_internal(),
        ctx.frontier.pending_external(),
    );
    ctx.observer.on_stats(&ctx.stats.snapshot());

    Ok(PageRecord {
        url: url.to_string(),
        structures,
        items,
        sensitive_data,
        internal_links: internal.iter().map(|u| u.to_string()).collect(),
        external_links: external.iter().map(|u| u.to_string()).collect(),
        depth,
        timestamp: Utc::now(),
    })
}

/// Resolves, canonicalizes, and classifies every link on the page
///
/// Returns per-page deduplicated internal and external link sets.
fn discover_page_links(
    markup: &str,
    url: &Url,
    ctx: &CrawlContext,
) -> (BTreeSet<Url>, BTreeSet<Url>) {
    let mut internal = BTreeSet::new();
    let mut external = BTreeSet::new();

    for link in extract::discover_links(markup, url) {
        let canonical = match canonicalize(link.as_str()) {
            Ok(canonical) => canonical,
            Err(e) => {
                tracing::debug!("Skipping link {}: {}", link, e);
                continue;
            }
        };
        match classify(&canonical, ctx.frontier.base_authority()) {
            LinkScope::Internal => internal.insert(canonical),
            LinkScope::External => external.insert(canonical),
        };
    }

    (internal, external)
}
