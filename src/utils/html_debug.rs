// src/utils/html_debug.rs
//
// Debug aid: writes a copy of the input document with every catalogue
// pattern match wrapped in a colored span, for eyeballing why a section
// did or did not locate. Never on the normal staging path.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::extractors::SectionCatalog;
use crate::utils::error::AppError;

const DEBUG_STYLE: &str = "<style>\n\
    .match-heading { background-color: #90EE90; }\n\
    .match-separator { background-color: #FFA500; }\n\
    .match-greeting { background-color: #ADD8E6; }\n\
    </style>\n";

/// Writes `html` to `output` with heading, separator and greeting
/// matches highlighted.
pub fn annotate_document(
    html: &str,
    output: &Path,
    catalog: &SectionCatalog,
    greeting: &Regex,
) -> Result<(), AppError> {
    let mut highlights: Vec<(usize, usize, &str)> = Vec::new();

    for section in catalog.sections() {
        // The catalogue patterns are anchored to whole heading text;
        // recompile unanchored to scan the raw markup.
        let scan = Regex::new(&format!("(?i){}", section.spec.heading))
            .map_err(|e| AppError::Config(format!("unscannable heading pattern: {e}")))?;
        for m in scan.find_iter(html) {
            highlights.push((m.start(), m.end(), "match-heading"));
        }
        if let Some(separator) = &section.spec.separator {
            let tag = format!("<{separator}");
            for (pos, _) in html.match_indices(&tag) {
                highlights.push((pos, pos + tag.len(), "match-separator"));
            }
        }
    }
    for m in greeting.find_iter(html) {
        highlights.push((m.start(), m.end(), "match-greeting"));
    }

    highlights.sort_by_key(|h| h.0);

    let mut annotated = String::with_capacity(html.len() + DEBUG_STYLE.len());
    annotated.push_str(DEBUG_STYLE);
    let mut last_pos = 0;
    for (start, end, class) in highlights {
        if start < last_pos {
            continue; // overlapping match, first one wins
        }
        annotated.push_str(&html[last_pos..start]);
        annotated.push_str(&format!("<span class=\"{class}\">"));
        annotated.push_str(&html[start..end]);
        annotated.push_str("</span>");
        last_pos = end;
    }
    annotated.push_str(&html[last_pos..]);

    fs::write(output, annotated)?;
    tracing::info!(file = %output.display(), "annotated copy written");
    Ok(())
}
