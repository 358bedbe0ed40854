// src/extractors/entry.rs
//
// Per-section extraction policy: turns the nodes collected by the
// boundary walk into typed records. One engine, parameterized by the
// catalogue's `ExtractionMode` - the policies differ only in how they
// discover items inside a node and in what they put in the preview.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use super::catalog::ExtractionMode;
use super::text::{self, UNKNOWN_AUTHOR};

static ANCHOR_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Failed to compile ANCHOR_SELECTOR"));

static EMPHASIS_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("strong, em, b").expect("Failed to compile EMPHASIS_SELECTOR"));

const EMPHASIS_TAGS: &[&str] = &["strong", "em", "b"];

// --- Data Structures ---

/// One record in a multi-entry section.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub title: Option<String>,
    pub author: Option<String>,
    pub preview: Option<String>,
    /// Verbatim markup of the whole containing node - never re-rendered,
    /// and intentionally shared by entries drawn from the same node.
    pub full_content: String,
    pub link: Option<String>,
    /// 1-based, continuous across all nodes in the section.
    pub display_order: u32,
}

/// One concatenated-content record for a single-aggregate section.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub preview: Option<String>,
    pub full_content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SectionRecords {
    Entries(Vec<Entry>),
    Aggregate(Aggregate),
}

/// Applies a section's extraction policy to its collected nodes.
/// Returns `None` only for an aggregate section with an empty body
/// (heading present, no record staged). Heuristic misses inside a node
/// degrade to sentinels - they never fail the parse.
pub fn extract(nodes: &[ElementRef], mode: &ExtractionMode) -> Option<SectionRecords> {
    match mode {
        ExtractionMode::Articles => Some(SectionRecords::Entries(extract_articles(nodes))),
        ExtractionMode::Bullets => Some(SectionRecords::Entries(extract_bullets(nodes))),
        ExtractionMode::Aggregate { preview_label } => {
            extract_aggregate(nodes, preview_label.clone()).map(SectionRecords::Aggregate)
        }
    }
}

// --- Multi-entry policies ---

/// Article policy: one entry per hyperlink anchor in each node. The
/// markup is irregular (titles sometimes linked, authors sometimes
/// unstyled), so each field is a layered fallback rather than a grammar:
///   title:  emphasized text inside the anchor -> anchor text -> node text
///   author: `by <name>` in the node text -> "Unknown"
///   link:   anchor href -> ""
fn extract_articles(nodes: &[ElementRef]) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut order = 1u32;

    for node in nodes {
        let node_html = node.html();
        let node_text = text::flatten(*node);
        let author = text::author_in(&node_text);

        let anchors: Vec<ElementRef> = node.select(&ANCHOR_SELECTOR).collect();
        if anchors.is_empty() {
            // Single-item paragraph: an emphasized run stands in for the
            // title and the whole flattened text is the best title we have.
            if node.select(&EMPHASIS_SELECTOR).next().is_some() && !node_text.is_empty() {
                entries.push(article_entry(node_text.clone(), &author, None, &node_html, &mut order));
            }
            continue;
        }

        for anchor in anchors {
            let title = anchor
                .select(&EMPHASIS_SELECTOR)
                .next()
                .map(text::flatten)
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| text::flatten(anchor));
            if title.is_empty() {
                continue; // image-only or decorative anchor
            }
            let link = anchor.value().attr("href").unwrap_or_default().to_string();
            entries.push(article_entry(title, &author, Some(link), &node_html, &mut order));
        }
    }

    entries
}

fn article_entry(
    title: String,
    author: &Option<String>,
    link: Option<String>,
    node_html: &str,
    order: &mut u32,
) -> Entry {
    let author = author.clone().unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());
    let preview = format!("{} by {}", title, author);
    let entry = Entry {
        title: Some(title),
        author: Some(author),
        preview: Some(preview),
        full_content: node_html.to_string(),
        link,
        display_order: *order,
    };
    *order += 1;
    entry
}

/// Bullet policy: one entry per emphasized span, the span's literal text
/// being the preview. No title/author/link is sought.
fn extract_bullets(nodes: &[ElementRef]) -> Vec<Entry> {
    let mut entries = Vec::new();
    let mut order = 1u32;

    for node in nodes {
        let node_html = node.html();
        for span in node.select(&EMPHASIS_SELECTOR) {
            if nested_in_emphasis(span, *node) {
                continue; // <strong><em>..</em></strong> counts once
            }
            let snippet = text::flatten(span);
            if snippet.is_empty() {
                continue;
            }
            entries.push(Entry {
                title: None,
                author: None,
                preview: Some(snippet),
                full_content: node_html.clone(),
                link: None,
                display_order: order,
            });
            order += 1;
        }
    }

    entries
}

fn nested_in_emphasis(span: ElementRef, root: ElementRef) -> bool {
    for node in span.ancestors() {
        if node.id() == root.id() {
            break;
        }
        if let Some(el) = ElementRef::wrap(node) {
            if EMPHASIS_TAGS.contains(&el.value().name()) {
                return true;
            }
        }
    }
    false
}

// --- Aggregate policy ---

/// Concatenates the verbatim markup of every collected node, in order.
/// An empty body yields no record at all.
fn extract_aggregate(nodes: &[ElementRef], preview: Option<String>) -> Option<Aggregate> {
    if nodes.is_empty() {
        return None;
    }
    let full_content = nodes.iter().map(|n| n.html()).collect::<Vec<_>>().join("\n");
    Some(Aggregate { preview, full_content })
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    static BODY_SELECTOR: Lazy<Selector> =
        Lazy::new(|| Selector::parse("body > *").unwrap());

    fn entries_for(html: &str, mode: &ExtractionMode) -> Vec<Entry> {
        let document = Html::parse_document(html);
        let nodes: Vec<ElementRef> = document.select(&BODY_SELECTOR).collect();
        match extract(&nodes, mode).unwrap() {
            SectionRecords::Entries(entries) => entries,
            SectionRecords::Aggregate(_) => panic!("expected entries"),
        }
    }

    fn aggregate_for(html: &str, label: Option<&str>) -> Option<Aggregate> {
        let document = Html::parse_document(html);
        let nodes: Vec<ElementRef> = document.select(&BODY_SELECTOR).collect();
        let mode = ExtractionMode::Aggregate {
            preview_label: label.map(str::to_string),
        };
        match extract(&nodes, &mode) {
            Some(SectionRecords::Aggregate(agg)) => Some(agg),
            Some(SectionRecords::Entries(_)) => panic!("expected aggregate"),
            None => None,
        }
    }

    #[test]
    fn linked_title_with_emphasized_author() {
        let html = r#"<body><p><a href="u"><em>"Title"</em></a> by <em>Name</em>:</p></body>"#;
        let entries = entries_for(html, &ExtractionMode::Articles);
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.title.as_deref(), Some(r#""Title""#));
        assert_eq!(entry.author.as_deref(), Some("Name"));
        assert_eq!(entry.link.as_deref(), Some("u"));
        assert_eq!(entry.preview.as_deref(), Some(r#""Title" by Name"#));
        assert_eq!(entry.display_order, 1);
        assert_eq!(entry.full_content, r#"<p><a href="u"><em>"Title"</em></a> by <em>Name</em>:</p>"#);
    }

    #[test]
    fn unlinked_emphasis_falls_back_to_anchor_text() {
        let html = r#"<body><p><a href="x">Plain link title</a> by Someone: blurb</p></body>"#;
        let entries = entries_for(html, &ExtractionMode::Articles);
        assert_eq!(entries[0].title.as_deref(), Some("Plain link title"));
        assert_eq!(entries[0].author.as_deref(), Some("Someone"));
    }

    #[test]
    fn unresolved_author_gets_the_sentinel() {
        let html = r#"<body><p><a href="x"><strong>Title</strong></a>: no attribution here</p></body>"#;
        let entries = entries_for(html, &ExtractionMode::Articles);
        assert_eq!(entries[0].author.as_deref(), Some("Unknown"));
        assert_eq!(entries[0].preview.as_deref(), Some("Title by Unknown"));
    }

    #[test]
    fn two_anchors_share_the_node_markup() {
        let html = r#"<body><p><a href="a"><strong>First</strong></a> and <a href="b"><strong>Second</strong></a> by One Author:</p></body>"#;
        let entries = entries_for(html, &ExtractionMode::Articles);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].display_order, 1);
        assert_eq!(entries[1].display_order, 2);
        assert_eq!(entries[0].full_content, entries[1].full_content);
        assert_eq!(entries[0].link.as_deref(), Some("a"));
        assert_eq!(entries[1].link.as_deref(), Some("b"));
    }

    #[test]
    fn anchorless_emphasized_paragraph_is_a_single_item() {
        let html = "<body><p><strong>Standalone piece</strong> by An Author: summary</p></body>";
        let entries = entries_for(html, &ExtractionMode::Articles);
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].title.as_deref(),
            Some("Standalone piece by An Author: summary")
        );
        assert_eq!(entries[0].author.as_deref(), Some("An Author"));
        assert_eq!(entries[0].link, None);
    }

    #[test]
    fn plain_paragraph_yields_no_article() {
        let html = "<body><p>Just prose, nothing marked up.</p></body>";
        let entries = entries_for(html, &ExtractionMode::Articles);
        assert!(entries.is_empty());
    }

    #[test]
    fn order_is_continuous_across_nodes() {
        let html = r#"<body>
            <p><a href="a"><strong>One</strong></a> by A:</p>
            <p><a href="b"><strong>Two</strong></a> by B:</p>
        </body>"#;
        let entries = entries_for(html, &ExtractionMode::Articles);
        let orders: Vec<u32> = entries.iter().map(|e| e.display_order).collect();
        assert_eq!(orders, vec![1, 2]);
    }

    #[test]
    fn bullets_make_one_entry_per_emphasized_span() {
        let html = "<body><p><strong>Tip one</strong> details, <strong>tip two</strong> more.</p></body>";
        let entries = entries_for(html, &ExtractionMode::Bullets);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].preview.as_deref(), Some("Tip one"));
        assert_eq!(entries[1].preview.as_deref(), Some("tip two"));
        assert_eq!(entries[0].display_order, 1);
        assert_eq!(entries[1].display_order, 2);
        // Both carry the whole paragraph verbatim.
        assert_eq!(entries[0].full_content, entries[1].full_content);
        assert!(entries[0].full_content.starts_with("<p>"));
        assert!(entries[0].title.is_none());
        assert!(entries[0].author.is_none());
    }

    #[test]
    fn nested_emphasis_counts_once() {
        let html = "<body><p><strong><em>Only tip</em></strong> rest of text</p></body>";
        let entries = entries_for(html, &ExtractionMode::Bullets);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].preview.as_deref(), Some("Only tip"));
    }

    #[test]
    fn aggregate_concatenates_in_order() {
        let html = "<body><p>one</p><ul><li>two</li></ul></body>";
        let agg = aggregate_for(html, Some("Release Notes")).unwrap();
        assert_eq!(agg.preview.as_deref(), Some("Release Notes"));
        assert_eq!(agg.full_content, "<p>one</p>\n<ul><li>two</li></ul>");
    }

    #[test]
    fn aggregate_preview_can_be_absent() {
        let agg = aggregate_for("<body><p>x</p></body>", None).unwrap();
        assert_eq!(agg.preview, None);
    }

    #[test]
    fn empty_aggregate_yields_no_record() {
        let document = Html::parse_document("<body></body>");
        let nodes: Vec<ElementRef> = document.select(&BODY_SELECTOR).collect();
        let mode = ExtractionMode::Aggregate { preview_label: None };
        assert!(extract(&nodes, &mode).is_none());
    }

    #[test]
    fn empty_multi_entry_section_is_valid() {
        let nodes: Vec<ElementRef> = Vec::new();
        match extract(&nodes, &ExtractionMode::Articles).unwrap() {
            SectionRecords::Entries(entries) => assert!(entries.is_empty()),
            SectionRecords::Aggregate(_) => panic!("expected entries"),
        }
    }
}
