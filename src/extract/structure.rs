//! Repeating-structure detection and item extraction
//!
//! Listing pages repeat one markup shape per entry (a product card, a search
//! result, an article teaser). Detection ranks class signatures by how often
//! they repeat, keeps the top candidates, and probes the first instance of
//! each with a battery of field detectors to build per-field selectors.
//! Extraction then replays those selectors over every instance.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use url::Url;

/// How many of the most-repeated class signatures are considered containers
const MAX_CONTAINERS: usize = 3;

static PRICE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+[,.]\d{2}|\d+\s*[€$£¥]|\$\s*\d+").unwrap());
static DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{2}[/-]\d{2}[/-]\d{4}|\d{4}[/-]\d{2}[/-]\d{2}").unwrap());
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap());
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\d{2,}[\s.-]?\d{2,}[\s.-]?\d{2,}").unwrap());
static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\d+\s+rue|\d+\s+avenue|\d+\s+boulevard|BP\s+\d+").unwrap());
static DESCRIPTION_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)desc|description|details|info|content|text").unwrap());

/// Selector recipe for one field of a detected structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// CSS selector relative to the container
    pub selector: String,

    /// Attribute to read instead of the element text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
}

/// One detected repeating structure on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureDescriptor {
    /// CSS selector matching every instance of the container
    pub container: String,

    /// Detected fields, keyed by field name
    pub fields: BTreeMap<String, FieldDescriptor>,
}

/// One item pulled out of a detected container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedItem {
    /// The page the item came from
    pub source_url: String,

    /// When the item was extracted
    pub timestamp: DateTime<Utc>,

    /// Field values; fields whose extraction failed are simply absent
    pub fields: BTreeMap<String, String>,
}

type FieldDetector = for<'a> fn(ElementRef<'a>) -> Option<FieldDescriptor>;

/// Field detectors probed against the first instance of each container
const FIELD_DETECTORS: &[(&str, FieldDetector)] = &[
    ("title", detect_title_field),
    ("price", detect_price_field),
    ("image", detect_image_field),
    ("link", detect_link_field),
    ("description", detect_description_field),
    ("date", detect_date_field),
    ("email", detect_email_field),
    ("phone", detect_phone_field),
    ("address", detect_address_field),
];

/// Detects the repeating data structures on a page
///
/// Ranks class signatures by repetition count, keeps the top
/// `MAX_CONTAINERS` that appear more than once, and returns a descriptor for
/// each candidate whose first instance yields at least one field.
pub fn detect_structures(markup: &str) -> Vec<StructureDescriptor> {
    let document = Html::parse_document(markup);

    let all = match Selector::parse("*") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    // Count repetitions per class signature; first_seen breaks ties so the
    // outermost (earliest) signature wins over the field classes nested in it.
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (index, element) in document.select(&all).enumerate() {
        let classes: Vec<&str> = element.value().classes().collect();
        if classes.is_empty() {
            continue;
        }
        let entry = counts.entry(classes.join(" ")).or_insert((0, index));
        entry.0 += 1;
    }

    let mut ranked: Vec<(String, (usize, usize))> =
        counts.into_iter().filter(|(_, (n, _))| *n > 1).collect();
    ranked.sort_by(|a, b| (b.1).0.cmp(&(a.1).0).then_with(|| (a.1).1.cmp(&(b.1).1)));
    ranked.truncate(MAX_CONTAINERS);

    let mut structures = Vec::new();
    for (signature, _) in ranked {
        let container = format!(".{}", signature.replace(' ', "."));
        if let Some(structure) = analyze_container(&document, &container) {
            if !structure.fields.is_empty() {
                structures.push(structure);
            }
        }
    }

    structures
}

/// Extracts items from every container instance using detected selectors
///
/// A field whose selector no longer matches, or whose attribute is absent,
/// is omitted from that item; the other fields and the item itself still
/// come through.
pub fn extract_items(
    markup: &str,
    source_url: &Url,
    structures: &[StructureDescriptor],
) -> Vec<ExtractedItem> {
    let document = Html::parse_document(markup);
    let mut items = Vec::new();

    for structure in structures {
        let container_selector = match Selector::parse(&structure.container) {
            Ok(selector) => selector,
            Err(_) => {
                tracing::debug!("Skipping unparseable container selector {}", structure.container);
                continue;
            }
        };

        for container in document.select(&container_selector) {
            let mut fields = BTreeMap::new();

            for (name, descriptor) in &structure.fields {
                let Ok(selector) = Selector::parse(&descriptor.selector) else {
                    continue;
                };
                let value = container.select(&selector).next().and_then(|element| {
                    match &descriptor.attribute {
                        Some(attribute) => {
                            element.value().attr(attribute).map(|v| v.to_string())
                        }
                        None => Some(element.text().collect::<String>().trim().to_string()),
                    }
                });
                if let Some(value) = value {
                    fields.insert(name.clone(), value);
                }
            }

            items.push(ExtractedItem {
                source_url: source_url.to_string(),
                timestamp: Utc::now(),
                fields,
            });
        }
    }

    items
}

/// Probes the first instance of a container with every field detector
fn analyze_container(document: &Html, container: &str) -> Option<StructureDescriptor> {
    let selector = Selector::parse(container).ok()?;
    let first = document.select(&selector).next()?;

    let mut fields = BTreeMap::new();
    for (name, detector) in FIELD_DETECTORS {
        if let Some(descriptor) = detector(first) {
            fields.insert((*name).to_string(), descriptor);
        }
    }

    Some(StructureDescriptor {
        container: container.to_string(),
        fields,
    })
}

/// Child elements of `element`, excluding `element` itself
fn descendant_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Text directly inside an element, not counting nested elements
fn own_text(element: ElementRef<'_>) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Builds the most specific simple selector available for an element
fn unique_selector(element: ElementRef<'_>) -> String {
    if let Some(id) = element.value().id() {
        return format!("#{}", id);
    }
    let classes: Vec<&str> = element.value().classes().collect();
    if !classes.is_empty() {
        return format!(".{}", classes.join("."));
    }
    element.value().name().to_string()
}

fn detect_title_field(element: ElementRef<'_>) -> Option<FieldDescriptor> {
    descendant_elements(element)
        .filter(|el| {
            matches!(el.value().name(), "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "a")
        })
        .find(|el| !el.text().collect::<String>().trim().is_empty())
        .map(|el| FieldDescriptor {
            selector: unique_selector(el),
            attribute: None,
        })
}

fn detect_price_field(element: ElementRef<'_>) -> Option<FieldDescriptor> {
    find_by_text(element, &PRICE_RE)
}

fn detect_image_field(element: ElementRef<'_>) -> Option<FieldDescriptor> {
    descendant_elements(element)
        .find(|el| el.value().name() == "img" && el.value().attr("src").is_some())
        .map(|el| FieldDescriptor {
            selector: unique_selector(el),
            attribute: Some("src".to_string()),
        })
}

fn detect_link_field(element: ElementRef<'_>) -> Option<FieldDescriptor> {
    descendant_elements(element)
        .find(|el| el.value().name() == "a" && el.value().attr("href").is_some())
        .map(|el| FieldDescriptor {
            selector: unique_selector(el),
            attribute: Some("href".to_string()),
        })
}

fn detect_description_field(element: ElementRef<'_>) -> Option<FieldDescriptor> {
    descendant_elements(element)
        .filter(|el| matches!(el.value().name(), "p" | "div"))
        .filter(|el| {
            el.value()
                .attr("class")
                .is_some_and(|c| DESCRIPTION_CLASS_RE.is_match(c))
        })
        .find(|el| el.text().collect::<String>().trim().len() > 50)
        .map(|el| FieldDescriptor {
            selector: unique_selector(el),
            attribute: None,
        })
}

fn detect_date_field(element: ElementRef<'_>) -> Option<FieldDescriptor> {
    find_by_text(element, &DATE_RE)
}

fn detect_email_field(element: ElementRef<'_>) -> Option<FieldDescriptor> {
    find_by_text(element, &EMAIL_RE)
}

fn detect_phone_field(element: ElementRef<'_>) -> Option<FieldDescriptor> {
    find_by_text(element, &PHONE_RE)
}

fn detect_address_field(element: ElementRef<'_>) -> Option<FieldDescriptor> {
    find_by_text(element, &ADDRESS_RE)
}

/// Finds the first descendant whose direct text matches the pattern
fn find_by_text(element: ElementRef<'_>, pattern: &Regex) -> Option<FieldDescriptor> {
    descendant_elements(element)
        .find(|el| pattern.is_match(&own_text(*el)))
        .map(|el| FieldDescriptor {
            selector: unique_selector(el),
            attribute: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<html><body>
        <div class="product-card">
            <h2 class="name">Widget Alpha</h2>
            <span class="cost">19,99 €</span>
            <img class="thumb" src="/img/alpha.jpg">
            <a class="more" href="/products/alpha">details</a>
        </div>
        <div class="product-card">
            <h2 class="name">Widget Beta</h2>
            <span class="cost">24,99 €</span>
            <img class="thumb" src="/img/beta.jpg">
            <a class="more" href="/products/beta">details</a>
        </div>
        <div class="product-card">
            <h2 class="name">Widget Gamma</h2>
            <span class="cost">9,50 €</span>
            <img class="thumb" src="/img/gamma.jpg">
            <a class="more" href="/products/gamma">details</a>
        </div>
    </body></html>"#;

    #[test]
    fn test_detects_repeating_container() {
        let structures = detect_structures(LISTING);
        assert!(!structures.is_empty());

        let card = structures
            .iter()
            .find(|s| s.container == ".product-card")
            .expect("product-card container should be detected");
        assert_eq!(
            card.fields.get("title"),
            Some(&FieldDescriptor {
                selector: ".name".to_string(),
                attribute: None
            })
        );
        assert_eq!(
            card.fields.get("price"),
            Some(&FieldDescriptor {
                selector: ".cost".to_string(),
                attribute: None
            })
        );
        assert_eq!(
            card.fields.get("image"),
            Some(&FieldDescriptor {
                selector: ".thumb".to_string(),
                attribute: Some("src".to_string())
            })
        );
        assert_eq!(
            card.fields.get("link"),
            Some(&FieldDescriptor {
                selector: ".more".to_string(),
                attribute: Some("href".to_string())
            })
        );
    }

    #[test]
    fn test_unrepeated_classes_are_not_containers() {
        let structures = detect_structures(
            r#"<div class="only-once"><h2>One</h2></div><p class="also-once">x</p>"#,
        );
        assert!(structures.is_empty());
    }

    #[test]
    fn test_extract_items_from_detected_structure() {
        let source = Url::parse("https://shop.example.com/catalog").unwrap();
        let structures = detect_structures(LISTING);
        let items = extract_items(LISTING, &source, &structures);

        let cards: Vec<&ExtractedItem> = items
            .iter()
            .filter(|i| i.fields.contains_key("title"))
            .collect();
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].fields.get("title").unwrap(), "Widget Alpha");
        assert_eq!(cards[0].fields.get("price").unwrap(), "19,99 €");
        assert_eq!(cards[0].fields.get("image").unwrap(), "/img/alpha.jpg");
        assert_eq!(cards[0].fields.get("link").unwrap(), "/products/alpha");
        assert_eq!(cards[0].source_url, "https://shop.example.com/catalog");
    }

    #[test]
    fn test_missing_field_is_omitted_not_fatal() {
        let source = Url::parse("https://example.com/").unwrap();
        let structure = StructureDescriptor {
            container: ".row".to_string(),
            fields: BTreeMap::from([
                (
                    "title".to_string(),
                    FieldDescriptor {
                        selector: ".t".to_string(),
                        attribute: None,
                    },
                ),
                (
                    "price".to_string(),
                    FieldDescriptor {
                        selector: ".absent".to_string(),
                        attribute: None,
                    },
                ),
            ]),
        };

        let items = extract_items(
            r#"<div class="row"><span class="t">only title</span></div>"#,
            &source,
            &[structure],
        );

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].fields.get("title").unwrap(), "only title");
        assert!(!items[0].fields.contains_key("price"));
    }

    #[test]
    fn test_own_text_ignores_nested_elements() {
        let html = Html::parse_fragment(r#"<div>outer <span>inner</span></div>"#);
        let selector = Selector::parse("div").unwrap();
        let div = html.select(&selector).next().unwrap();
        assert_eq!(own_text(div), "outer");
    }
}
