//! Sensitive-data detection over page text and markup
//!
//! Scans the visible text for email addresses, phone numbers, and social
//! profile links, and the markup for elements that advertise sensitive data
//! through attributes or class/id naming. Every finding carries surrounding
//! context and a coarse confidence score.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;

/// Characters of surrounding text kept on each side of a match
const CONTEXT_WINDOW: usize = 50;

static EMAIL_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
        r"(?i)mailto:[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static PHONE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"\+?[\d][\d\s.-]{8,}[\d]",
        r"\(\d{2,4}\)\s*\d{6,10}",
        r"\d{2}[\s.-]?\d{2}[\s.-]?\d{2}[\s.-]?\d{2}[\s.-]?\d{2}",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static SOCIAL_PATTERNS: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    vec![
        (
            "facebook",
            Regex::new(r"(?i)(?:facebook\.com|fb\.com)/[\w.]+").unwrap(),
        ),
        (
            "twitter",
            Regex::new(r"(?i)(?:twitter\.com|x\.com)/\w+").unwrap(),
        ),
        (
            "linkedin",
            Regex::new(r"(?i)linkedin\.com/(?:in|company)/[\w-]+").unwrap(),
        ),
        (
            "instagram",
            Regex::new(r"(?i)instagram\.com/[\w.]+").unwrap(),
        ),
    ]
});

/// Attributes that mark an element as carrying sensitive data
const SENSITIVE_ATTRS: &[&str] = &["data-email", "data-phone", "data-user", "data-id"];

/// Class/id name fragments that suggest sensitive content
const SENSITIVE_NAME_HINTS: &[&str] = &["email", "phone", "contact", "user", "profile"];

/// An email address found in page text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailFinding {
    pub email: String,
    pub context: String,
    pub confidence: f64,
}

/// A phone number found in page text, normalized to digits
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhoneFinding {
    pub phone: String,
    pub context: String,
    pub confidence: f64,
}

/// A markup element flagged by attribute or naming heuristics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitiveElement {
    pub kind: String,
    pub value: String,
    pub context: String,
}

/// Everything the sensitive-data scan produced for one page
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SensitiveFindings {
    pub emails: Vec<EmailFinding>,
    pub phones: Vec<PhoneFinding>,
    pub social_media: BTreeMap<String, Vec<String>>,
    pub potential_sensitive: Vec<SensitiveElement>,
}

/// Runs every detector over the page
///
/// # Arguments
///
/// * `text` - The visible text of the page
/// * `markup` - The rendered markup of the page
pub fn extract_all(text: &str, markup: &str) -> SensitiveFindings {
    SensitiveFindings {
        emails: extract_emails(text),
        phones: extract_phones(text),
        social_media: extract_social_media(text),
        potential_sensitive: detect_markup_sensitive(markup),
    }
}

/// Extracts email addresses with context, deduplicated by address
pub fn extract_emails(text: &str) -> Vec<EmailFinding> {
    let mut findings: Vec<EmailFinding> = Vec::new();

    for pattern in EMAIL_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let email = m
                .as_str()
                .trim()
                .trim_start_matches("mailto:")
                .to_string();
            if findings.iter().any(|f| f.email == email) {
                continue;
            }
            findings.push(EmailFinding {
                confidence: email_confidence(&email),
                context: context_around(text, m.start(), m.end()),
                email,
            });
        }
    }

    findings
}

/// Extracts phone numbers with context, deduplicated by normalized digits
pub fn extract_phones(text: &str) -> Vec<PhoneFinding> {
    let mut findings: Vec<PhoneFinding> = Vec::new();

    for pattern in PHONE_PATTERNS.iter() {
        for m in pattern.find_iter(text) {
            let normalized = normalize_phone(m.as_str());
            // Runs of separators can satisfy the loose patterns without
            // containing an actual number.
            if normalized.chars().filter(|c| c.is_ascii_digit()).count() < 8 {
                continue;
            }
            if findings.iter().any(|f| f.phone == normalized) {
                continue;
            }
            findings.push(PhoneFinding {
                confidence: phone_confidence(&normalized),
                context: context_around(text, m.start(), m.end()),
                phone: normalized,
            });
        }
    }

    findings
}

/// Extracts social profile references, grouped by platform
pub fn extract_social_media(text: &str) -> BTreeMap<String, Vec<String>> {
    let mut social = BTreeMap::new();

    for (platform, pattern) in SOCIAL_PATTERNS.iter() {
        let mut matches: Vec<String> = Vec::new();
        for m in pattern.find_iter(text) {
            let value = m.as_str().to_string();
            if !matches.contains(&value) {
                matches.push(value);
            }
        }
        social.insert((*platform).to_string(), matches);
    }

    social
}

/// Flags markup elements whose attributes or naming suggest sensitive data
pub fn detect_markup_sensitive(markup: &str) -> Vec<SensitiveElement> {
    let document = Html::parse_document(markup);
    let mut found = Vec::new();

    for attr in SENSITIVE_ATTRS {
        let Ok(selector) = Selector::parse(&format!("[{}]", attr)) else {
            continue;
        };
        for element in document.select(&selector) {
            if let Some(value) = element.value().attr(attr) {
                found.push(SensitiveElement {
                    kind: (*attr).to_string(),
                    value: value.to_string(),
                    context: element_text(element),
                });
            }
        }
    }

    let Ok(all) = Selector::parse("*") else {
        return found;
    };
    for element in document.select(&all) {
        let class = element.value().attr("class").unwrap_or("").to_lowercase();
        let id = element.value().attr("id").unwrap_or("").to_lowercase();

        for hint in SENSITIVE_NAME_HINTS {
            if !class.contains(hint) && !id.contains(hint) {
                continue;
            }
            let value = element_text(element);
            if value.is_empty() {
                continue;
            }
            let context = element
                .parent()
                .and_then(ElementRef::wrap)
                .map(element_text)
                .unwrap_or_else(|| value.clone());
            found.push(SensitiveElement {
                kind: format!("potential_{}", hint),
                value,
                context,
            });
        }
    }

    found
}

/// Strips everything but digits and a leading plus sign
fn normalize_phone(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Coarse confidence from address length
fn email_confidence(email: &str) -> f64 {
    let Some((local, domain)) = email.split_once('@') else {
        return 0.0;
    };
    if local.is_empty() || !domain.contains('.') {
        return 0.0;
    }
    ((local.len() + domain.len()) as f64 / 50.0).min(1.0)
}

/// Coarse confidence from digit count
fn phone_confidence(phone: &str) -> f64 {
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    (digits as f64 / 15.0).min(1.0)
}

/// Takes `CONTEXT_WINDOW` characters around a match, on char boundaries
fn context_around(text: &str, start: usize, end: usize) -> String {
    let mut from = start.saturating_sub(CONTEXT_WINDOW);
    while from > 0 && !text.is_char_boundary(from) {
        from -= 1;
    }
    let mut to = (end + CONTEXT_WINDOW).min(text.len());
    while to < text.len() && !text.is_char_boundary(to) {
        to += 1;
    }
    text[from..to].trim().to_string()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}
