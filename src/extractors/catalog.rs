// src/extractors/catalog.rs
//
// The section catalogue is the single source of truth for section
// behavior: heading pattern, boundary separator, and extraction mode.
// Adding a section to the newsletter template means adding a table
// entry here (or in a catalogue file), not a new code path.

use std::fs;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::error::CatalogError;

/// How a section's collected nodes become records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Multi-entry: one record per hyperlink anchor, with title/author
    /// resolved per node (Knowledge Base).
    Articles,
    /// Multi-entry: one record per emphasized span, the span text being
    /// the preview (Fine Tuning).
    Bullets,
    /// Single record concatenating the whole section body.
    Aggregate {
        #[serde(default)]
        preview_label: Option<String>,
    },
}

/// Declarative description of one named section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpec {
    /// Display name, also stored in the `section` column ("Knowledge Base").
    pub name: String,
    /// Case-insensitive pattern matched against a heading's normalized
    /// flattened text. Anchored on compile so an incidental mention inside
    /// body text can never pass for a heading.
    pub heading: String,
    /// Tag that ends the section before any next heading ("hr" for Alignment).
    #[serde(default)]
    pub separator: Option<String>,
    pub mode: ExtractionMode,
}

/// A section spec with its heading pattern compiled.
#[derive(Debug, Clone)]
pub struct Section {
    pub spec: SectionSpec,
    pub heading_re: Regex,
}

#[derive(Debug, Clone)]
pub struct SectionCatalog {
    sections: Vec<Section>,
}

impl SectionCatalog {
    /// Compiles every heading pattern, anchored to the whole normalized
    /// heading text (leading/trailing punctuation tolerated).
    pub fn compile(specs: Vec<SectionSpec>) -> Result<Self, CatalogError> {
        let mut sections = Vec::with_capacity(specs.len());
        for spec in specs {
            let anchored = format!(r"(?i)^\W*(?:{})\W*$", spec.heading);
            let heading_re =
                Regex::new(&anchored).map_err(|source| CatalogError::InvalidPattern {
                    section: spec.name.clone(),
                    pattern: spec.heading.clone(),
                    source,
                })?;
            sections.push(Section { spec, heading_re });
        }
        Ok(Self { sections })
    }

    /// The stock newsletter template catalogue.
    pub fn builtin() -> Self {
        Self::compile(builtin_specs()).expect("built-in catalogue patterns compile")
    }

    /// Loads an alternative catalogue from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        let specs: Vec<SectionSpec> = serde_json::from_str(&raw)?;
        Self::compile(specs)
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// True when `heading_text` names any registered section other than
    /// `current` - the boundary-walk stop condition.
    pub fn names_other_section(&self, heading_text: &str, current: &str) -> bool {
        self.sections
            .iter()
            .any(|s| s.spec.name != current && s.heading_re.is_match(heading_text))
    }
}

fn builtin_specs() -> Vec<SectionSpec> {
    vec![
        SectionSpec {
            name: "Knowledge Base".to_string(),
            heading: r"knowledge[\s\-]*base".to_string(),
            separator: None,
            mode: ExtractionMode::Articles,
        },
        SectionSpec {
            name: "Fine Tuning".to_string(),
            heading: r"fine[\s\-]*tuning".to_string(),
            separator: None,
            mode: ExtractionMode::Bullets,
        },
        SectionSpec {
            name: "Release Notes".to_string(),
            heading: r"release[\s\-]*notes".to_string(),
            separator: None,
            mode: ExtractionMode::Aggregate {
                preview_label: Some("Release Notes".to_string()),
            },
        },
        SectionSpec {
            name: "Hallucination".to_string(),
            heading: r"hallucination".to_string(),
            separator: None,
            mode: ExtractionMode::Aggregate {
                preview_label: Some("Hallucination".to_string()),
            },
        },
        SectionSpec {
            name: "Alignment".to_string(),
            heading: r"alignment".to_string(),
            // The closing section runs to the sign-off rule, not to a heading.
            separator: Some("hr".to_string()),
            mode: ExtractionMode::Aggregate {
                preview_label: Some("Alignment".to_string()),
            },
        },
    ]
}
