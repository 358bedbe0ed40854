// src/main.rs
mod extractors;
mod source;
mod storage;
mod utils;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::Parser;
use regex::Regex;

use extractors::{header, SectionCatalog};
use source::{IssueNumbering, SourceDocument};
use storage::{IssueRecord, MemorySink, SqliteSink};
use utils::AppError;

/// Stages newsletter HTML issues into a relational store.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Newsletter HTML files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// SQLite database the records are staged into
    #[arg(short, long, default_value = "newsletter.sqlite")]
    db: PathBuf,

    /// Issue number override; without it the number is derived from each filename
    #[arg(short = 'n', long)]
    issue_number: Option<u32>,

    /// Publication date override (RFC 3339); defaults to document metadata, then now
    #[arg(long)]
    publication_date: Option<DateTime<Utc>>,

    /// JSON file describing the section catalogue (defaults to the built-in one)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Editor's-note greeting pattern override (case-insensitive, matched at paragraph start)
    #[arg(long)]
    greeting: Option<String>,

    /// Extract and report without writing to the database
    #[arg(long)]
    dry_run: bool,

    /// Save an annotated copy of each input with catalogue matches highlighted
    #[arg(short = 'D', long)]
    debug: bool,
}

fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments
    let args = Args::parse();
    tracing::info!(files = args.files.len(), "starting newsletter staging run");

    if args.issue_number.is_some() && args.files.len() > 1 {
        return Err(AppError::Config(
            "--issue-number applies to a single input file".to_string(),
        ));
    }

    // 3. Build the section catalogue and greeting pattern
    let catalog = match &args.catalog {
        Some(path) => SectionCatalog::from_file(path)?,
        None => SectionCatalog::builtin(),
    };
    let greeting = match &args.greeting {
        Some(pattern) => Regex::new(&format!("(?i)^(?:{pattern})"))
            .map_err(|e| AppError::Config(format!("invalid greeting pattern: {e}")))?,
        None => header::DEFAULT_GREETING.clone(),
    };

    // 4. Open the sink unless this is a dry run
    let mut sink = if args.dry_run {
        None
    } else {
        Some(SqliteSink::open(&args.db)?)
    };

    // 5. Process each file independently
    let mut success_count = 0usize;
    let mut failure_count = 0usize;

    for path in &args.files {
        match process_file(path, &args, &catalog, &greeting, sink.as_mut()) {
            Ok(()) => success_count += 1,
            Err(e) => {
                tracing::error!(file = %path.display(), error = %e, "failed to stage issue");
                failure_count += 1;
            }
        }
    }

    tracing::info!(success_count, failure_count, "processing finished");

    if success_count == 0 && failure_count > 0 {
        return Err(AppError::Config(format!(
            "failed to stage all {failure_count} input files"
        )));
    }

    Ok(())
}

fn process_file(
    path: &Path,
    args: &Args,
    catalog: &SectionCatalog,
    greeting: &Regex,
    sink: Option<&mut SqliteSink>,
) -> Result<(), AppError> {
    let document = SourceDocument::read(path)?;

    // Resolve the issue number before any extraction work.
    let numbering = match args.issue_number {
        Some(number) => IssueNumbering::Explicit(number),
        None => IssueNumbering::Derived,
    };
    let issue_number = document.issue_number(numbering)?;
    tracing::info!(issue = issue_number, file = %path.display(), "parsing issue");

    if args.debug {
        let annotated = path.with_extension("annotated.html");
        if let Err(e) = utils::html_debug::annotate_document(&document.raw, &annotated, catalog, greeting)
        {
            tracing::warn!(error = %e, "could not write annotated copy");
        }
    }

    let tree = document.parse();
    let extracted = extractors::extract_document(&tree, catalog, greeting);
    tracing::info!(
        issue = issue_number,
        sections = extracted.sections.len(),
        headline = %extracted.masthead.headline,
        "extraction complete"
    );

    let publication_date = args
        .publication_date
        .or(extracted.masthead.published)
        .unwrap_or_else(Utc::now);
    let issue = IssueRecord {
        issue_number,
        publication_date,
        headline: extracted.masthead.headline.clone(),
        subheadline: extracted.masthead.subheadline.clone(),
        editors_note: extracted.masthead.editors_note.clone(),
    };

    match sink {
        Some(db) => {
            let issue_id = db.persist(&issue, &extracted)?;
            tracing::info!(issue_id, "issue staged");
        }
        None => {
            let mut staged = MemorySink::default();
            storage::stage_document(&mut staged, &issue, &extracted)?;
            tracing::info!(
                entries = staged.entries.len(),
                aggregates = staged.aggregates.len(),
                "dry run, nothing written"
            );
        }
    }

    Ok(())
}
