//! Anchor discovery and resolution

use scraper::{Html, Selector};
use url::Url;

/// Extracts every followable anchor target from a page
///
/// Each `href` is resolved against the current URL, so relative links come
/// back absolute. Anchor-only, `javascript:`, `mailto:`, `tel:`, and `data:`
/// targets are skipped, as is anything that does not resolve to http(s).
///
/// # Arguments
///
/// * `markup` - The rendered page markup
/// * `base_url` - The URL the page was fetched from
///
/// # Returns
///
/// Absolute, fetchable URLs in document order (duplicates included)
pub fn discover_links(markup: &str, base_url: &Url) -> Vec<Url> {
    let document = Html::parse_document(markup);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(resolved) = resolve_link(href, base_url) {
                    links.push(resolved);
                }
            }
        }
    }

    links
}

/// Resolves one href against the base URL, filtering unfetchable targets
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let resolved = base_url.join(href).ok()?;
    if resolved.scheme() == "http" || resolved.scheme() == "https" {
        Some(resolved)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://example.com/section/page").unwrap()
    }

    fn links_of(html: &str) -> Vec<String> {
        discover_links(html, &base_url())
            .into_iter()
            .map(|u| u.to_string())
            .collect()
    }

    #[test]
    fn test_absolute_link() {
        let links = links_of(r#"<a href="https://other.com/p">x</a>"#);
        assert_eq!(links, vec!["https://other.com/p"]);
    }

    #[test]
    fn test_relative_links_resolve_against_page() {
        let links = links_of(r#"<a href="/root">a</a><a href="sibling">b</a>"#);
        assert_eq!(
            links,
            vec![
                "https://example.com/root",
                "https://example.com/section/sibling"
            ]
        );
    }

    #[test]
    fn test_skips_anchor_and_script_schemes() {
        let links = links_of(
            r##"<a href="#top">a</a>
                <a href="javascript:void(0)">b</a>
                <a href="mailto:x@example.com">c</a>
                <a href="tel:+331234">d</a>
                <a href="/keep">e</a>"##,
        );
        assert_eq!(links, vec!["https://example.com/keep"]);
    }

    #[test]
    fn test_keeps_duplicates_in_document_order() {
        let links = links_of(r#"<a href="/p">a</a><a href="/p">b</a>"#);
        assert_eq!(links.len(), 2);
    }

    #[test]
    fn test_empty_href_skipped() {
        let links = links_of(r#"<a href="">a</a><a href="   ">b</a>"#);
        assert!(links.is_empty());
    }
}
