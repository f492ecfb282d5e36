use crate::UrlError;
use sha2::{Digest, Sha256};
use url::Url;

/// Tracking query parameters removed during canonicalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// Canonicalizes a URL for deduplication
///
/// Two URLs that differ only by fragment or by known tracking parameters are
/// the same page as far as the crawl is concerned, so both are stripped here.
/// The remaining query parameters keep their original order. The operation is
/// idempotent: canonicalizing a canonical URL is a no-op.
///
/// # Arguments
///
/// * `url_str` - The URL string to canonicalize
///
/// # Returns
///
/// * `Ok(Url)` - The canonical URL
/// * `Err(UrlError)` - The URL is malformed, non-http(s), or has no host
///
/// # Examples
///
/// ```
/// use arpenteur::url::canonicalize;
///
/// let url = canonicalize("http://a.com/p?utm_source=x#f").unwrap();
/// assert_eq!(url.as_str(), "http://a.com/p");
/// ```
pub fn canonicalize(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    // Fragments never reach the server; they are pure duplication noise.
    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            let query = kept
                .iter()
                .map(|(k, v)| {
                    if v.is_empty() {
                        k.clone()
                    } else {
                        format!("{}={}", k, v)
                    }
                })
                .collect::<Vec<_>>()
                .join("&");
            url.set_query(Some(&query));
        }
    }

    Ok(url)
}

/// Checks whether a URL is a fetchable crawl target
///
/// Anchors, `mailto:`, `tel:`, and `javascript:` targets are rejected by the
/// scheme check; anything without a host is rejected as well.
pub fn is_fetchable(url: &Url) -> bool {
    (url.scheme() == "http" || url.scheme() == "https") && url.host_str().is_some()
}

/// Computes the stable page key for a canonical URL
///
/// The key is the hex-encoded SHA-256 digest of the canonical URL string and
/// is used as the map key for page records and the report.
pub fn page_key(url: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
