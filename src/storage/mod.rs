// src/storage/mod.rs
//
// Record sink: stages one extracted issue into the relational store.
// The contract is all-or-nothing per issue - a failed write rolls the
// whole issue back so no partial state is ever persisted.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::extractors::{Aggregate, Entry, ExtractedDocument, SectionRecords};
use crate::utils::error::SinkError;

/// Fully resolved issue header, ready to persist.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueRecord {
    pub issue_number: u32,
    pub publication_date: DateTime<Utc>,
    pub headline: String,
    pub subheadline: Option<String>,
    pub editors_note: Option<String>,
}

/// Destination for staged records.
pub trait RecordSink {
    fn create_issue(&mut self, issue: &IssueRecord) -> Result<i64, SinkError>;

    fn append_entry(&mut self, issue_id: i64, section: &str, entry: &Entry)
        -> Result<(), SinkError>;

    fn append_aggregate(
        &mut self,
        issue_id: i64,
        section: &str,
        aggregate: &Aggregate,
    ) -> Result<(), SinkError>;
}

/// Pushes one extracted document through a sink in record order.
pub fn stage_document<S: RecordSink>(
    sink: &mut S,
    issue: &IssueRecord,
    document: &ExtractedDocument,
) -> Result<i64, SinkError> {
    let issue_id = sink.create_issue(issue)?;
    for content in &document.sections {
        match &content.records {
            SectionRecords::Entries(entries) => {
                for entry in entries {
                    sink.append_entry(issue_id, &content.section, entry)?;
                }
            }
            SectionRecords::Aggregate(aggregate) => {
                sink.append_aggregate(issue_id, &content.section, aggregate)?;
            }
        }
    }
    Ok(issue_id)
}

// --- SQLite sink ---

pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SinkError> {
        Self::with_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, SinkError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, SinkError> {
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let sink = Self { conn };
        sink.init_schema()?;
        Ok(sink)
    }

    fn init_schema(&self) -> Result<(), SinkError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS newsletter_issues (
                id               INTEGER PRIMARY KEY,
                issue_number     INTEGER NOT NULL UNIQUE,
                publication_date TEXT NOT NULL,
                headline         TEXT NOT NULL,
                subheadline      TEXT,
                editors_note     TEXT
            );

            CREATE TABLE IF NOT EXISTS newsletter_entries (
                id            INTEGER PRIMARY KEY,
                issue_id      INTEGER NOT NULL REFERENCES newsletter_issues(id) ON DELETE CASCADE,
                section       TEXT NOT NULL,
                title         TEXT,
                author        TEXT,
                preview_text  TEXT,
                full_content  TEXT NOT NULL,
                link          TEXT,
                display_order INTEGER NOT NULL,
                UNIQUE(issue_id, section, display_order)
            );
            CREATE INDEX IF NOT EXISTS idx_entries_issue ON newsletter_entries(issue_id);

            CREATE TABLE IF NOT EXISTS section_aggregates (
                id           INTEGER PRIMARY KEY,
                issue_id     INTEGER NOT NULL REFERENCES newsletter_issues(id) ON DELETE CASCADE,
                section      TEXT NOT NULL,
                preview_text TEXT,
                full_content TEXT NOT NULL,
                UNIQUE(issue_id, section)
            );
            ",
        )?;
        Ok(())
    }

    /// Stages a whole issue inside one transaction. Any failed write
    /// rolls back everything staged for the issue.
    pub fn persist(
        &mut self,
        issue: &IssueRecord,
        document: &ExtractedDocument,
    ) -> Result<i64, SinkError> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match stage_document(self, issue, document) {
            Ok(issue_id) => {
                self.conn.execute_batch("COMMIT")?;
                tracing::info!(issue = issue.issue_number, issue_id, "issue committed");
                Ok(issue_id)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                tracing::warn!(issue = issue.issue_number, error = %err, "issue rolled back");
                Err(err)
            }
        }
    }
}

impl RecordSink for SqliteSink {
    fn create_issue(&mut self, issue: &IssueRecord) -> Result<i64, SinkError> {
        self.conn.execute(
            "INSERT INTO newsletter_issues
             (issue_number, publication_date, headline, subheadline, editors_note)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                issue.issue_number,
                issue.publication_date.to_rfc3339(),
                issue.headline,
                issue.subheadline,
                issue.editors_note,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn append_entry(
        &mut self,
        issue_id: i64,
        section: &str,
        entry: &Entry,
    ) -> Result<(), SinkError> {
        self.conn.execute(
            "INSERT INTO newsletter_entries
             (issue_id, section, title, author, preview_text, full_content, link, display_order)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                issue_id,
                section,
                entry.title,
                entry.author,
                entry.preview,
                entry.full_content,
                entry.link,
                entry.display_order,
            ],
        )?;
        Ok(())
    }

    fn append_aggregate(
        &mut self,
        issue_id: i64,
        section: &str,
        aggregate: &Aggregate,
    ) -> Result<(), SinkError> {
        self.conn.execute(
            "INSERT INTO section_aggregates (issue_id, section, preview_text, full_content)
             VALUES (?1, ?2, ?3, ?4)",
            params![issue_id, section, aggregate.preview, aggregate.full_content],
        )?;
        Ok(())
    }
}

// --- In-memory sink ---

/// Collects records without persisting anything; backs `--dry-run` and
/// unit tests of the staging order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub issues: Vec<IssueRecord>,
    pub entries: Vec<(i64, String, Entry)>,
    pub aggregates: Vec<(i64, String, Aggregate)>,
}

impl RecordSink for MemorySink {
    fn create_issue(&mut self, issue: &IssueRecord) -> Result<i64, SinkError> {
        self.issues.push(issue.clone());
        Ok(self.issues.len() as i64)
    }

    fn append_entry(
        &mut self,
        issue_id: i64,
        section: &str,
        entry: &Entry,
    ) -> Result<(), SinkError> {
        self.entries.push((issue_id, section.to_string(), entry.clone()));
        Ok(())
    }

    fn append_aggregate(
        &mut self,
        issue_id: i64,
        section: &str,
        aggregate: &Aggregate,
    ) -> Result<(), SinkError> {
        self.aggregates.push((issue_id, section.to_string(), aggregate.clone()));
        Ok(())
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::{Masthead, SectionContent};
    use chrono::TimeZone;

    fn issue(number: u32) -> IssueRecord {
        IssueRecord {
            issue_number: number,
            publication_date: Utc.with_ymd_and_hms(2025, 1, 5, 14, 0, 0).unwrap(),
            headline: "The Sunday Digest".to_string(),
            subheadline: Some("Weekly digest".to_string()),
            editors_note: None,
        }
    }

    fn entry(order: u32) -> Entry {
        Entry {
            title: Some(format!("Title {order}")),
            author: Some("Unknown".to_string()),
            preview: Some(format!("Title {order} by Unknown")),
            full_content: "<p>markup</p>".to_string(),
            link: Some("https://example.com".to_string()),
            display_order: order,
        }
    }

    fn document(entries: Vec<Entry>) -> ExtractedDocument {
        ExtractedDocument {
            masthead: Masthead {
                headline: "The Sunday Digest".to_string(),
                subheadline: None,
                editors_note: None,
                published: None,
            },
            sections: vec![
                SectionContent {
                    section: "Knowledge Base".to_string(),
                    records: SectionRecords::Entries(entries),
                },
                SectionContent {
                    section: "Release Notes".to_string(),
                    records: SectionRecords::Aggregate(Aggregate {
                        preview: Some("Release Notes".to_string()),
                        full_content: "<p>v2</p>".to_string(),
                    }),
                },
            ],
        }
    }

    fn count(conn: &Connection, sql: &str) -> i64 {
        conn.query_row(sql, [], |row| row.get(0)).unwrap()
    }

    #[test]
    fn persist_stages_all_records() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        let issue_id = sink.persist(&issue(1215), &document(vec![entry(1), entry(2)])).unwrap();

        assert_eq!(count(&sink.conn, "SELECT COUNT(*) FROM newsletter_issues"), 1);
        assert_eq!(count(&sink.conn, "SELECT COUNT(*) FROM newsletter_entries"), 2);
        assert_eq!(count(&sink.conn, "SELECT COUNT(*) FROM section_aggregates"), 1);

        let stored_order: i64 = sink
            .conn
            .query_row(
                "SELECT MAX(display_order) FROM newsletter_entries WHERE issue_id = ?1",
                [issue_id],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(stored_order, 2);
    }

    #[test]
    fn failed_write_rolls_back_the_whole_issue() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        // Duplicate display order violates UNIQUE(issue_id, section, display_order).
        let bad = document(vec![entry(1), entry(1)]);
        assert!(sink.persist(&issue(1215), &bad).is_err());

        assert_eq!(count(&sink.conn, "SELECT COUNT(*) FROM newsletter_issues"), 0);
        assert_eq!(count(&sink.conn, "SELECT COUNT(*) FROM newsletter_entries"), 0);
        assert_eq!(count(&sink.conn, "SELECT COUNT(*) FROM section_aggregates"), 0);
    }

    #[test]
    fn duplicate_issue_number_fails_without_touching_the_first() {
        let mut sink = SqliteSink::open_in_memory().unwrap();
        sink.persist(&issue(1215), &document(vec![entry(1)])).unwrap();
        assert!(sink.persist(&issue(1215), &document(vec![entry(1)])).is_err());

        assert_eq!(count(&sink.conn, "SELECT COUNT(*) FROM newsletter_issues"), 1);
        assert_eq!(count(&sink.conn, "SELECT COUNT(*) FROM newsletter_entries"), 1);
    }

    #[test]
    fn memory_sink_preserves_staging_order() {
        let mut sink = MemorySink::default();
        let issue_id = stage_document(&mut sink, &issue(7), &document(vec![entry(1), entry(2)])).unwrap();

        assert_eq!(sink.issues.len(), 1);
        assert_eq!(sink.entries.len(), 2);
        assert_eq!(sink.aggregates.len(), 1);
        assert_eq!(sink.entries[0].0, issue_id);
        assert_eq!(sink.entries[0].2.display_order, 1);
        assert_eq!(sink.entries[1].2.display_order, 2);
        assert_eq!(sink.aggregates[0].1, "Release Notes");
    }
}
