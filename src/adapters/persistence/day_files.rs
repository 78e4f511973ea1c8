//! Implements RecordSource over the collector's per-day JSONL logs.
//! One file per day: {base_dir}/mensagens_{YYYY-MM-DD}.json, one JSON object per line.
//! Days are opened lazily, one at a time; a missing day file is not an error.

use crate::domain::dates::{DATE_FORMAT, days_in_range};
use crate::domain::{DomainError, MessageRecord};
use crate::ports::{RecordSource, RecordStream, SourceEvent};
use chrono::NaiveDate;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Lines};
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-system reader for day files.
pub struct DayFileReader {
    base_dir: PathBuf,
}

impl DayFileReader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn day_path(&self, date: NaiveDate) -> PathBuf {
        day_path(&self.base_dir, date)
    }

}

fn day_path(base_dir: &Path, date: NaiveDate) -> PathBuf {
    base_dir.join(format!("mensagens_{}.json", date.format(DATE_FORMAT)))
}

impl RecordSource for DayFileReader {
    fn read_range(&self, start: NaiveDate, end: NaiveDate) -> RecordStream<'_> {
        Box::new(DayFileStream {
            base_dir: &self.base_dir,
            days: days_in_range(start, end).into_iter(),
            current: None,
            failed: false,
        })
    }
}

struct OpenDay {
    path: PathBuf,
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

struct DayFileStream<'a> {
    base_dir: &'a Path,
    days: std::vec::IntoIter<NaiveDate>,
    current: Option<OpenDay>,
    failed: bool,
}

impl DayFileStream<'_> {
    fn fail(&mut self, err: DomainError) -> Option<Result<SourceEvent, DomainError>> {
        self.failed = true;
        self.current = None;
        Some(Err(err))
    }
}

impl Iterator for DayFileStream<'_> {
    type Item = Result<SourceEvent, DomainError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        loop {
            if let Some(day) = self.current.as_mut() {
                match day.lines.next() {
                    Some(Ok(line)) => {
                        day.line_no += 1;
                        let trimmed = line.trim();
                        if trimmed.is_empty() {
                            continue;
                        }
                        return Some(Ok(match serde_json::from_str::<MessageRecord>(trimmed) {
                            Ok(record) => SourceEvent::Record(record),
                            Err(e) => SourceEvent::Malformed {
                                path: day.path.clone(),
                                line: day.line_no,
                                reason: e.to_string(),
                            },
                        }));
                    }
                    // Invalid UTF-8: the bytes are consumed, so the line can be skipped.
                    Some(Err(e)) if e.kind() == ErrorKind::InvalidData => {
                        day.line_no += 1;
                        return Some(Ok(SourceEvent::Malformed {
                            path: day.path.clone(),
                            line: day.line_no,
                            reason: e.to_string(),
                        }));
                    }
                    Some(Err(e)) => {
                        let msg = format!("{}: {}", day.path.display(), e);
                        return self.fail(DomainError::Read(msg));
                    }
                    None => {
                        debug!(path = %day.path.display(), lines = day.line_no, "day file done");
                        self.current = None;
                    }
                }
            }

            let date = self.days.next()?;
            let path = day_path(self.base_dir, date);
            match File::open(&path) {
                Ok(file) => {
                    debug!(path = %path.display(), "reading day file");
                    self.current = Some(OpenDay {
                        path: path.clone(),
                        lines: BufReader::new(file).lines(),
                        line_no: 0,
                    });
                    return Some(Ok(SourceEvent::DayOpened { date, path }));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    debug!(path = %path.display(), "no day file");
                    return Some(Ok(SourceEvent::DayMissing { date }));
                }
                Err(e) => {
                    let msg = format!("{}: {}", path.display(), e);
                    return self.fail(DomainError::Read(msg));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dates::parse_date;
    use std::fs;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn line(id: i64, data: &str) -> String {
        format!(
            r#"{{"message_id": {id}, "group_name": "G", "sender": 1, "data": "{data}", "mediatype": null, "content": "m{id}"}}"#
        )
    }

    #[test]
    fn test_day_path_format() {
        let reader = DayFileReader::new("/data/mensagens");
        assert_eq!(
            reader.day_path(d("2020-09-18")),
            PathBuf::from("/data/mensagens/mensagens_2020-09-18.json")
        );
    }

    #[test]
    fn test_reads_days_in_order_and_skips_missing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("mensagens_2020-09-20.json"),
            format!("{}\n{}\n", line(3, "2020-09-20 08:00:00"), line(4, "2020-09-20 07:00:00")),
        )
        .unwrap();
        fs::write(
            dir.path().join("mensagens_2020-09-18.json"),
            format!("{}\n", line(1, "2020-09-18 10:00:00")),
        )
        .unwrap();

        let reader = DayFileReader::new(dir.path());
        let events: Vec<SourceEvent> = reader
            .read_range(d("2020-09-18"), d("2020-09-20"))
            .collect::<Result<_, _>>()
            .unwrap();

        assert!(matches!(events[0], SourceEvent::DayOpened { .. }));
        assert!(matches!(events[2], SourceEvent::DayMissing { .. }));
        assert_eq!(events.len(), 6);

        let ids: Vec<i64> = events
            .iter()
            .filter_map(|e| match e {
                SourceEvent::Record(r) => Some(r.message_id),
                _ => None,
            })
            .collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn test_reversed_range_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let reader = DayFileReader::new(dir.path());
        assert_eq!(reader.read_range(d("2020-09-19"), d("2020-09-18")).count(), 0);
    }

    #[test]
    fn test_malformed_and_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("mensagens_2020-09-18.json"),
            format!("{}\n\n{{not json\n{}\n", line(1, "2020-09-18 10:00:00"), line(2, "2020-09-18 11:00:00")),
        )
        .unwrap();

        let reader = DayFileReader::new(dir.path());
        let events: Vec<SourceEvent> = reader
            .read_range(d("2020-09-18"), d("2020-09-18"))
            .collect::<Result<_, _>>()
            .unwrap();
        let malformed: Vec<&SourceEvent> = events
            .iter()
            .filter(|e| matches!(e, SourceEvent::Malformed { .. }))
            .collect();
        assert_eq!(malformed.len(), 1);
        match malformed[0] {
            SourceEvent::Malformed { line, .. } => assert_eq!(*line, 3),
            _ => unreachable!(),
        }
        let records = events
            .iter()
            .filter(|e| matches!(e, SourceEvent::Record(_)))
            .count();
        assert_eq!(records, 2);
    }
}
