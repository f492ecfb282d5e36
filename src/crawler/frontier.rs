//! URL frontier and visited set
//!
//! The frontier holds discovered-but-not-yet-fetched (URL, depth) pairs in
//! two FIFO queues, internal and external, deduplicated against both queues
//! and the visited set. Dequeue-for-dispatch marks the URL visited under the
//! same lock, which is what makes duplicate dispatch impossible: a canonical
//! URL is in at most one of {queued, visited} at any instant.

use crate::url::{authority, classify, LinkScope};
use crate::UrlError;
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use url::Url;

/// A discovered crawl target
///
/// Depth is fixed at discovery time: parent depth + 1, seed at 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    pub url: Url,
    pub depth: u32,
}

/// Outcome of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discovery {
    /// Queued on the internal queue
    QueuedInternal,
    /// Queued on the external queue
    QueuedExternal,
    /// Already queued or already visited
    AlreadySeen,
    /// Deeper than the configured maximum; dropped at discovery time
    BeyondDepth,
    /// External target while external exploration is disabled
    ExternalDisabled,
}

struct FrontierInner {
    internal: VecDeque<FrontierEntry>,
    external: VecDeque<FrontierEntry>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

/// Dedup-aware two-queue frontier
pub struct Frontier {
    base_authority: String,
    max_depth: u32,
    explore_external: bool,
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    /// Creates an empty frontier for a crawl rooted at `seed`
    ///
    /// The seed's authority is the internal/external boundary for the whole
    /// crawl.
    pub fn new(seed: &Url, max_depth: u32, explore_external: bool) -> Result<Self, UrlError> {
        let base_authority = authority(seed).ok_or(UrlError::MissingHost)?;
        Ok(Self {
            base_authority,
            max_depth,
            explore_external,
            inner: Mutex::new(FrontierInner {
                internal: VecDeque::new(),
                external: VecDeque::new(),
                queued: HashSet::new(),
                visited: HashSet::new(),
            }),
        })
    }

    /// The authority every link is classified against
    pub fn base_authority(&self) -> &str {
        &self.base_authority
    }

    /// Offers a canonical URL for future dispatch
    ///
    /// Beyond-depth entries are dropped here, at discovery time, so they
    /// never occupy queue space. Duplicates of anything queued or visited
    /// are no-ops. External URLs are only queued when external exploration
    /// is enabled.
    pub fn discover(&self, url: &Url, depth: u32) -> Discovery {
        if depth > self.max_depth {
            return Discovery::BeyondDepth;
        }

        let scope = classify(url, &self.base_authority);
        let key = url.to_string();

        let mut inner = self.inner.lock().unwrap();
        if inner.visited.contains(&key) || inner.queued.contains(&key) {
            return Discovery::AlreadySeen;
        }

        match scope {
            LinkScope::Internal => {
                inner.queued.insert(key);
                inner.internal.push_back(FrontierEntry {
                    url: url.clone(),
                    depth,
                });
                Discovery::QueuedInternal
            }
            LinkScope::External if self.explore_external => {
                inner.queued.insert(key);
                inner.external.push_back(FrontierEntry {
                    url: url.clone(),
                    depth,
                });
                Discovery::QueuedExternal
            }
            LinkScope::External => Discovery::ExternalDisabled,
        }
    }

    /// Dequeues the next internal entry and marks it visited
    pub fn next_internal(&self) -> Option<FrontierEntry> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner.internal.pop_front()?;
        Self::mark_dispatched(&mut inner, &entry);
        Some(entry)
    }

    /// Dequeues the next external entry and marks it visited
    pub fn next_external(&self) -> Option<FrontierEntry> {
        let mut inner = self.inner.lock().unwrap();
        let entry = inner.external.pop_front()?;
        Self::mark_dispatched(&mut inner, &entry);
        Some(entry)
    }

    fn mark_dispatched(inner: &mut FrontierInner, entry: &FrontierEntry) {
        let key = entry.url.to_string();
        inner.queued.remove(&key);
        inner.visited.insert(key);
    }

    /// Number of URLs dispatched so far
    pub fn visited_count(&self) -> usize {
        self.inner.lock().unwrap().visited.len()
    }

    /// Internal entries waiting for dispatch
    pub fn pending_internal(&self) -> usize {
        self.inner.lock().unwrap().internal.len()
    }

    /// External entries waiting for dispatch
    pub fn pending_external(&self) -> usize {
        self.inner.lock().unwrap().external.len()
    }

    /// Whether both queues are empty
    pub fn is_empty(&self) -> bool {
        let inner = self.inner.lock().unwrap();
        inner.internal.is_empty() && inner.external.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url::canonicalize;

    fn frontier(explore_external: bool) -> Frontier {
        let seed = canonicalize("https://example.com/").unwrap();
        Frontier::new(&seed, 2, explore_external).unwrap()
    }

    fn url(s: &str) -> Url {
        canonicalize(s).unwrap()
    }

    #[test]
    fn test_discover_classifies_by_authority() {
        let frontier = frontier(true);

        assert_eq!(
            frontier.discover(&url("https://example.com/a"), 1),
            Discovery::QueuedInternal
        );
        assert_eq!(
            frontier.discover(&url("https://other.com/b"), 1),
            Discovery::QueuedExternal
        );
        assert_eq!(frontier.pending_internal(), 1);
        assert_eq!(frontier.pending_external(), 1);
    }

    #[test]
    fn test_discover_drops_beyond_max_depth() {
        let frontier = frontier(false);

        assert_eq!(
            frontier.discover(&url("https://example.com/deep"), 3),
            Discovery::BeyondDepth
        );
        assert!(frontier.is_empty());
    }

    #[test]
    fn test_discover_at_max_depth_is_kept() {
        let frontier = frontier(false);
        assert_eq!(
            frontier.discover(&url("https://example.com/edge"), 2),
            Discovery::QueuedInternal
        );
    }

    #[test]
    fn test_duplicate_discovery_is_noop() {
        let frontier = frontier(false);
        let target = url("https://example.com/a");

        assert_eq!(frontier.discover(&target, 1), Discovery::QueuedInternal);
        assert_eq!(frontier.discover(&target, 1), Discovery::AlreadySeen);
        assert_eq!(frontier.pending_internal(), 1);
    }

    #[test]
    fn test_visited_url_is_never_requeued() {
        let frontier = frontier(false);
        let target = url("https://example.com/a");

        frontier.discover(&target, 1);
        let entry = frontier.next_internal().unwrap();
        assert_eq!(entry.url, target);
        assert_eq!(frontier.visited_count(), 1);

        assert_eq!(frontier.discover(&target, 1), Discovery::AlreadySeen);
        assert!(frontier.next_internal().is_none());
    }

    #[test]
    fn test_fifo_dispatch_order() {
        let frontier = frontier(false);
        frontier.discover(&url("https://example.com/first"), 1);
        frontier.discover(&url("https://example.com/second"), 1);
        frontier.discover(&url("https://example.com/third"), 1);

        assert_eq!(
            frontier.next_internal().unwrap().url.as_str(),
            "https://example.com/first"
        );
        assert_eq!(
            frontier.next_internal().unwrap().url.as_str(),
            "https://example.com/second"
        );
        assert_eq!(
            frontier.next_internal().unwrap().url.as_str(),
            "https://example.com/third"
        );
    }

    #[test]
    fn test_external_disabled_drops_external() {
        let frontier = frontier(false);
        assert_eq!(
            frontier.discover(&url("https://other.com/"), 1),
            Discovery::ExternalDisabled
        );
        assert_eq!(frontier.pending_external(), 0);
    }

    #[test]
    fn test_external_queue_dispatch() {
        let frontier = frontier(true);
        frontier.discover(&url("https://other.com/x"), 1);

        let entry = frontier.next_external().unwrap();
        assert_eq!(entry.url.as_str(), "https://other.com/x");
        assert_eq!(frontier.visited_count(), 1);
    }

    #[test]
    fn test_tracking_variants_collapse_to_one_entry() {
        let frontier = frontier(false);
        frontier.discover(&url("https://example.com/p?utm_source=a"), 1);
        frontier.discover(&url("https://example.com/p?utm_source=b#frag"), 1);

        assert_eq!(frontier.pending_internal(), 1);
    }
}
