// src/source/mod.rs
//
// Document loading: one UTF-8 HTML file per invocation. Issue numbering
// is resolved here, before any extraction work, so a malformed
// identifier aborts the parse with nothing staged.

use std::fs;
use std::path::{Path, PathBuf};

use scraper::Html;

use crate::utils::error::LoadError;

/// How an issue gets its number. Both modes are legitimate: archives
/// name files after the issue ("1215.html"), ad-hoc runs pass the
/// number explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueNumbering {
    /// Number supplied by the caller.
    Explicit(u32),
    /// Parsed from the source file stem ("1215.html" -> 1215).
    Derived,
}

/// One newsletter document read from disk.
#[derive(Debug)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub raw: String,
}

impl SourceDocument {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref().to_path_buf();
        let raw = fs::read_to_string(&path).map_err(|source| LoadError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(file = %path.display(), bytes = raw.len(), "document loaded");
        Ok(Self { path, raw })
    }

    /// Resolves the issue number for this document.
    pub fn issue_number(&self, numbering: IssueNumbering) -> Result<u32, LoadError> {
        match numbering {
            IssueNumbering::Explicit(number) => Ok(number),
            IssueNumbering::Derived => {
                let stem = self
                    .path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or_default();
                stem.parse::<u32>()
                    .map_err(|_| LoadError::MalformedIssueIdentifier(stem.to_string()))
            }
        }
    }

    /// Parses the raw markup into the immutable document tree the
    /// extractors traverse.
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.raw)
    }
}
