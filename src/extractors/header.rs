// src/extractors/header.rs
//
// Issue-header extraction: headline, subheadline, editor's note and
// publication timestamp. Every field is a fallback chain ending in a
// sentinel or absence - nothing here can fail a parse.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

use super::text::{self, UNTITLED};

// --- CSS Selectors (Lazy Static) ---
static DISPLAY_TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1.handwriting").expect("Failed to compile DISPLAY_TITLE_SELECTOR")
});

static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to compile TITLE_SELECTOR"));

static SUBTITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p.subtitle").expect("Failed to compile SUBTITLE_SELECTOR"));

static META_DESCRIPTION_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[name="description"]"#).expect("Failed to compile META_DESCRIPTION_SELECTOR")
});

static META_PUBLISHED_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="article:published_time"]"#)
        .expect("Failed to compile META_PUBLISHED_SELECTOR")
});

static PARAGRAPH_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("p").expect("Failed to compile PARAGRAPH_SELECTOR"));

/// Stock opening of the editor's note ("Hello, and happy Sunday! ...").
pub static DEFAULT_GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^hello,?\s+and\s+happy\s+\w+").expect("Failed to compile DEFAULT_GREETING")
});

/// Header fields of one issue, before the issue number is attached.
#[derive(Debug, Clone, PartialEq)]
pub struct Masthead {
    pub headline: String,
    pub subheadline: Option<String>,
    pub editors_note: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

pub fn extract_with_greeting(document: &Html, greeting: &Regex) -> Masthead {
    Masthead {
        headline: headline(document),
        subheadline: subheadline(document),
        editors_note: editors_note(document, greeting),
        published: published(document),
    }
}

/// Display-title style -> declared title metadata -> "Untitled".
fn headline(document: &Html) -> String {
    document
        .select(&DISPLAY_TITLE_SELECTOR)
        .next()
        .map(text::flatten)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            document
                .select(&TITLE_SELECTOR)
                .next()
                .map(text::flatten)
                .filter(|t| !t.is_empty())
        })
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Subtitle style -> declared description metadata -> none.
fn subheadline(document: &Html) -> Option<String> {
    document
        .select(&SUBTITLE_SELECTOR)
        .next()
        .map(text::flatten)
        .filter(|t| !t.is_empty())
        .or_else(|| {
            document
                .select(&META_DESCRIPTION_SELECTOR)
                .next()
                .and_then(|meta| meta.value().attr("content"))
                .map(text::normalize)
                .filter(|t| !t.is_empty())
        })
}

/// First paragraph opening with the greeting -> none.
fn editors_note(document: &Html, greeting: &Regex) -> Option<String> {
    document
        .select(&PARAGRAPH_SELECTOR)
        .map(text::flatten)
        .find(|t| greeting.is_match(t))
}

/// `article:published_time` metadata parsed as RFC 3339; the caller
/// substitutes its own clock when absent.
fn published(document: &Html) -> Option<DateTime<Utc>> {
    document
        .select(&META_PUBLISHED_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
}
