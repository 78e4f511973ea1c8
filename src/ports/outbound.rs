//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{DomainError, MessageRecord, Summary};
use crate::usecases::RunStats;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

/// One step of a date-range read.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// A day file exists and is about to be read.
    DayOpened { date: NaiveDate, path: PathBuf },
    /// No file for this day; it contributes no records.
    DayMissing { date: NaiveDate },
    Record(MessageRecord),
    /// A non-blank line that did not parse. `line` is 1-based.
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

pub type RecordStream<'a> = Box<dyn Iterator<Item = Result<SourceEvent, DomainError>> + 'a>;

/// Date-range reader. Yields day files in ascending date order, lines in file order.
pub trait RecordSource: Send + Sync {
    /// Lazily read every day in `start..=end`. An empty range yields nothing.
    /// An `Err` item is fatal; the stream ends after it.
    fn read_range(&self, start: NaiveDate, end: NaiveDate) -> RecordStream<'_>;
}

/// Aggregate serializer. Persists a finished summary in one write.
pub trait SummarySink: Send + Sync {
    fn write_summary(&self, summary: &Summary, output: &Path) -> Result<(), DomainError>;
}

/// Progress reporting for a run (day-by-day).
pub trait RunObserver: Send + Sync {
    fn day_started(&self, date: NaiveDate, present: bool);

    fn finished(&self, stats: &RunStats);
}

/// Observer that reports nothing.
pub struct NoopObserver;

impl RunObserver for NoopObserver {
    fn day_started(&self, _date: NaiveDate, _present: bool) {}

    fn finished(&self, _stats: &RunStats) {}
}
