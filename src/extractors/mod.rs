// src/extractors/mod.rs
pub mod catalog;
pub mod entry;
pub mod header;
pub mod section;
pub mod text;

use regex::Regex;
use scraper::Html;

// Re-export key extraction types for convenience
pub use catalog::{ExtractionMode, Section, SectionCatalog, SectionSpec};
pub use entry::{Aggregate, Entry, SectionRecords};
pub use header::Masthead;

/// Records of one located section.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionContent {
    pub section: String,
    pub records: SectionRecords,
}

/// Everything one parse pass yields for a single document. Pure data:
/// producing it touches no external state, so re-parsing the same markup
/// yields the same records in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedDocument {
    pub masthead: Masthead,
    pub sections: Vec<SectionContent>,
}

/// Runs the full segmentation pass over a parsed document: locate each
/// catalogued section, walk its boundary, apply its extraction policy.
/// A section whose heading is absent contributes nothing.
pub fn extract_document(
    document: &Html,
    catalog: &SectionCatalog,
    greeting: &Regex,
) -> ExtractedDocument {
    let masthead = header::extract_with_greeting(document, greeting);

    let mut sections = Vec::new();
    for sec in catalog.sections() {
        let Some(heading) = section::locate(document, sec) else {
            tracing::debug!(section = %sec.spec.name, "heading not found, section skipped");
            continue;
        };
        let nodes = section::collect(heading, sec, catalog);
        tracing::debug!(section = %sec.spec.name, nodes = nodes.len(), "section body collected");
        if let Some(records) = entry::extract(&nodes, &sec.spec.mode) {
            sections.push(SectionContent {
                section: sec.spec.name.clone(),
                records,
            });
        }
    }

    ExtractedDocument { masthead, sections }
}
