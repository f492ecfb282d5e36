use url::Url;

/// Whether a link stays on the crawl's base site or leaves it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkScope {
    /// Same authority as the seed URL
    Internal,
    /// Any other authority
    External,
}

/// Extracts the authority (host, plus port when explicit) from a URL
///
/// The authority is the comparison key for internal/external classification.
/// Default ports are already normalized away by the URL parser, so
/// `https://example.com` and `https://example.com:443` compare equal.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use arpenteur::url::authority;
///
/// let url = Url::parse("https://Example.COM/path").unwrap();
/// assert_eq!(authority(&url), Some("example.com".to_string()));
///
/// let url = Url::parse("http://127.0.0.1:8080/").unwrap();
/// assert_eq!(authority(&url), Some("127.0.0.1:8080".to_string()));
/// ```
pub fn authority(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

/// Classifies a URL against the crawl's base authority
pub fn classify(url: &Url, base_authority: &str) -> LinkScope {
    match authority(url) {
        Some(auth) if auth == base_authority => LinkScope::Internal,
        _ => LinkScope::External,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authority_simple() {
        let url = Url::parse("https://example.com/path").unwrap();
        assert_eq!(authority(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_authority_with_port() {
        let url = Url::parse("http://127.0.0.1:4444/").unwrap();
        assert_eq!(authority(&url), Some("127.0.0.1:4444".to_string()));
    }

    #[test]
    fn test_authority_default_port_elided() {
        let url = Url::parse("https://example.com:443/").unwrap();
        assert_eq!(authority(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_classify_internal() {
        let url = Url::parse("https://example.com/deep/page").unwrap();
        assert_eq!(classify(&url, "example.com"), LinkScope::Internal);
    }

    #[test]
    fn test_classify_external() {
        let url = Url::parse("https://other.com/page").unwrap();
        assert_eq!(classify(&url, "example.com"), LinkScope::External);
    }

    #[test]
    fn test_classify_subdomain_is_external() {
        let url = Url::parse("https://blog.example.com/post").unwrap();
        assert_eq!(classify(&url, "example.com"), LinkScope::External);
    }
}
