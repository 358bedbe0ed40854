// src/utils/error.rs
use std::path::PathBuf;
use thiserror::Error;

// Define specific error types for different parts of the application
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Derived numbering mode only; aborts before any extraction work.
    #[error("cannot derive an issue number from source '{0}': file stem must be an integer")]
    MalformedIssueIdentifier(String),
}

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("invalid heading pattern '{pattern}' for section '{section}': {source}")]
    InvalidPattern {
        section: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to read catalogue file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed catalogue file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A write to the staging store failed; the caller discards the whole issue.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Document loading failed: {0}")]
    Load(#[from] LoadError),

    #[error("Section catalogue error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Record sink failure: {0}")]
    Sink(#[from] SinkError),
}
