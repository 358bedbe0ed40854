// src/extractors/text.rs
//
// Text-pattern heuristics for fields the markup does not convey
// structurally. Kept separate from the DOM walkers so each fallback
// chain can be tested on plain strings.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;

/// Placeholder when no author can be resolved from a paragraph.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Placeholder when no headline can be resolved from a document.
pub const UNTITLED: &str = "Untitled";

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RE"));

// "by <name>", terminated at the next colon or end of text.
static AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bby\s+([^:]+)").expect("Failed to compile AUTHOR_RE"));

/// Collapses whitespace runs (including non-breaking spaces) to single
/// spaces and trims the result.
pub fn normalize(raw: &str) -> String {
    let unified = raw.replace('\u{a0}', " ");
    let collapsed = WHITESPACE_RE.replace_all(&unified, " ");
    collapsed.trim().to_string()
}

/// Normalized flattened text of an element and all its descendants.
pub fn flatten(element: ElementRef) -> String {
    normalize(&element.text().collect::<String>())
}

/// Author name from flattened paragraph text. The markup is irregular
/// (the name is sometimes emphasized, sometimes bare), so this works on
/// text alone: the first `by <name>` run, cut at the colon that starts
/// the blurb.
pub fn author_in(text: &str) -> Option<String> {
    AUTHOR_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|name| normalize(name.as_str()))
        .filter(|name| !name.is_empty())
}
