// src/extractors/section.rs

// --- Imports ---
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use super::catalog::{Section, SectionCatalog};
use super::text;

// --- CSS Selectors (Lazy Static) ---
// Tags that can carry a section heading in this template family. The
// template mostly uses <h2>, but older issues mark headings with a bare
// <strong> inside its own paragraph.
static HEADING_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, strong").expect("Failed to compile HEADING_SELECTOR")
});

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "strong"];

// Paragraph-level elements that carry section content. Anything else
// between headings (rules, scripts, stray text nodes) is skipped without
// terminating the walk.
const CONTENT_TAGS: &[&str] = &["p", "ul", "ol", "div", "table", "blockquote", "figure"];

/// Finds the heading element for a named section: first heading-level
/// node in document order whose normalized text matches the section's
/// pattern. A missing heading is not an error - the section simply
/// contributes nothing.
pub fn locate<'a>(document: &'a Html, section: &Section) -> Option<ElementRef<'a>> {
    document
        .select(&HEADING_SELECTOR)
        .find(|el| section.heading_re.is_match(&text::flatten(*el)))
        .map(promote_inline_heading)
}

/// A `strong` used as a heading usually sits alone inside a block
/// (`<p><strong>Fine tuning</strong></p>`); boundary walking must start
/// at that block, not at the inline span, or the walk would never leave
/// the wrapping paragraph.
fn promote_inline_heading(el: ElementRef) -> ElementRef {
    if el.value().name() != "strong" {
        return el;
    }
    let label = text::flatten(el);
    let mut promoted = el;
    for node in el.ancestors() {
        let Some(ancestor) = ElementRef::wrap(node) else { break };
        if CONTENT_TAGS.contains(&ancestor.value().name()) && text::flatten(ancestor) == label {
            promoted = ancestor;
        } else {
            break;
        }
    }
    promoted
}

/// Walks the siblings after `heading` in order, collecting paragraph-level
/// content until a stop node: a heading for any *other* registered section,
/// or the section's separator tag where one is configured. The stop node is
/// excluded; sibling exhaustion also terminates the walk. Zero collected
/// nodes is valid ("section present but empty").
pub fn collect<'a>(
    heading: ElementRef<'a>,
    section: &Section,
    catalog: &SectionCatalog,
) -> Vec<ElementRef<'a>> {
    let mut nodes = Vec::new();
    for sibling in heading.next_siblings() {
        let Some(el) = ElementRef::wrap(sibling) else { continue };
        if stops_section(el, section, catalog) {
            tracing::trace!(section = %section.spec.name, stop = el.value().name(), "boundary reached");
            break;
        }
        if CONTENT_TAGS.contains(&el.value().name()) {
            nodes.push(el);
        }
    }
    nodes
}

/// Stop condition for the boundary walk. Headings are matched by tag
/// identity plus the anchored catalogue pattern - never by a substring
/// found anywhere in a node's text, which would false-positive on
/// paragraphs that merely mention another section.
fn stops_section(el: ElementRef, section: &Section, catalog: &SectionCatalog) -> bool {
    if let Some(separator) = &section.spec.separator {
        if el.value().name() == separator.as_str() {
            return true;
        }
    }
    // The sibling may be the next heading itself, or wrap one (the
    // template sometimes nests the heading in a container block).
    if is_foreign_heading(el, section, catalog) {
        return true;
    }
    el.select(&HEADING_SELECTOR)
        .any(|h| is_foreign_heading(h, section, catalog))
}

fn is_foreign_heading(el: ElementRef, section: &Section, catalog: &SectionCatalog) -> bool {
    HEADING_TAGS.contains(&el.value().name())
        && catalog.names_other_section(&text::flatten(el), &section.spec.name)
}
