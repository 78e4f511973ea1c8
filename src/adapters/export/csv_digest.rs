//! CSV digest of a summary. Uses the `csv` crate for safe serialization.
//!
//! One row per cluster, in output order: `key;first_share;total;total_groups;total_users`
//! (semicolon-delimited, like the rest of our tabular exports).

use crate::adapters::persistence::atomic::write_replace;
use crate::domain::{DigestRow, DomainError, Summary};
use crate::ports::SummarySink;
use std::path::Path;
use tracing::info;

pub const DIGEST_HEADER: [&str; 5] = ["key", "first_share", "total", "total_groups", "total_users"];

/// Convert digest rows to a CSV string with a header row.
pub fn digest_to_csv(rows: &[DigestRow]) -> Result<String, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .from_writer(Vec::new());

    wtr.write_record(DIGEST_HEADER)?;
    for row in rows {
        let record = [
            row.key.clone(),
            row.first_share.clone(),
            row.total.to_string(),
            row.total_groups.to_string(),
            row.total_users.to_string(),
        ];
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    let bytes = wtr
        .into_inner()
        .map_err(|e| csv::Error::from(std::io::Error::other(e.to_string())))?;

    String::from_utf8(bytes).map_err(|e| {
        csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })
}

/// Writes the digest next to (or instead of) the JSON summary.
#[derive(Debug, Default)]
pub struct CsvDigestWriter;

impl CsvDigestWriter {
    pub fn new() -> Self {
        Self
    }
}

impl SummarySink for CsvDigestWriter {
    fn write_summary(&self, summary: &Summary, output: &Path) -> Result<(), DomainError> {
        let rows = summary.digest();
        let csv = digest_to_csv(&rows).map_err(|e| DomainError::Write(e.to_string()))?;
        write_replace(output, csv.as_bytes())?;
        info!(path = %output.display(), rows = rows.len(), "wrote digest (CSV)");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(key: &str, total: usize) -> DigestRow {
        DigestRow {
            key: key.to_string(),
            first_share: "2020-09-18 10:00:00".to_string(),
            total,
            total_groups: 1,
            total_users: total,
        }
    }

    #[test]
    fn test_digest_to_csv_basic() {
        let csv = digest_to_csv(&[row("abc123", 2), row("def", 1)]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "key;first_share;total;total_groups;total_users");
        assert_eq!(lines[1], "abc123;2020-09-18 10:00:00;2;1;2");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_digest_quotes_delimiters() {
        let csv = digest_to_csv(&[row("a;b", 1)]).unwrap();
        assert!(csv.contains("\"a;b\""));
    }

    #[test]
    fn test_empty_digest_has_header_only() {
        let csv = digest_to_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
