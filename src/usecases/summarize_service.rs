//! Main summarization logic: validate request -> read day range -> group/cluster -> write once.
//!
//! - Configuration errors are raised before any day file is opened
//! - Malformed lines are skipped and counted, never fatal
//! - The JSON summary is written only after the whole range has been consumed

use crate::domain::clustering::{DEFAULT_MIN_SIZE, DEFAULT_THRESHOLD};
use crate::domain::dates::{DATE_FORMAT, parse_date};
use crate::domain::{
    DomainError, HashGrouper, MessageRecord, Offer, Summary, SummaryTarget, TextClusterer,
};
use crate::ports::{NoopObserver, RecordSource, RunObserver, SourceEvent, SummarySink};
use crate::shared::config::AppConfig;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Parameters of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub target: SummaryTarget,
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Explicit output path; `None` derives one from target and range.
    pub output: Option<PathBuf>,
    /// Optional CSV digest path.
    pub digest: Option<PathBuf>,
    pub min_size: usize,
    pub threshold: f64,
    pub include_captions: bool,
}

impl SummaryRequest {
    /// Parse operator input. `end_date` defaults to `start_date` (single-day run).
    pub fn parse(
        media_type: &str,
        comparison_method: &str,
        start_date: &str,
        end_date: Option<&str>,
    ) -> Result<Self, DomainError> {
        let target = SummaryTarget::parse(media_type, comparison_method)?;
        let start = parse_date(start_date)?;
        let end = match end_date {
            Some(e) => parse_date(e)?,
            None => start,
        };
        Ok(Self {
            target,
            start,
            end,
            output: None,
            digest: None,
            min_size: DEFAULT_MIN_SIZE,
            threshold: DEFAULT_THRESHOLD,
            include_captions: false,
        })
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_digest(mut self, digest: impl Into<PathBuf>) -> Self {
        self.digest = Some(digest.into());
        self
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_captions(mut self, include: bool) -> Self {
        self.include_captions = include;
        self
    }

    /// Fill the tunables from `cfg`, letting every value given in `cli` win.
    pub fn apply_config(self, cfg: &AppConfig, cli: RequestOverrides) -> Self {
        let request = self
            .with_min_size(cli.min_size.unwrap_or_else(|| cfg.min_size_or_default()))
            .with_threshold(cli.threshold.unwrap_or_else(|| cfg.threshold_or_default()))
            .with_captions(cli.include_captions || cfg.include_captions_or_default());
        let request = match cli.output {
            Some(path) => request.with_output(path),
            None => request,
        };
        match cli.digest {
            Some(path) => request.with_digest(path),
            None => request,
        }
    }

    /// Days in `start..=end`, 0 when the range is reversed.
    pub fn day_count(&self) -> usize {
        usize::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    /// `merged_data_<kind>-<method>_<start>-<end>.json`
    pub fn default_file_name(&self) -> String {
        format!(
            "merged_data_{}-{}_{}-{}.json",
            self.target.record_kind(),
            self.target.method_name(),
            self.start.format(DATE_FORMAT),
            self.end.format(DATE_FORMAT)
        )
    }

    pub fn output_path(&self, output_dir: &Path) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| output_dir.join(self.default_file_name()))
    }
}

/// Values given on the command line. `None` (or `false`) defers to config.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RequestOverrides {
    pub min_size: Option<usize>,
    pub threshold: Option<f64>,
    pub include_captions: bool,
    pub output: Option<PathBuf>,
    pub digest: Option<PathBuf>,
}

/// Counters for one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub days_in_range: usize,
    pub day_files_found: usize,
    pub lines_read: usize,
    pub malformed_lines: usize,
    pub records_absorbed: usize,
    pub records_skipped: usize,
    pub clusters: usize,
}

/// Everything a run produced. `summary` is exactly what was written to `output`.
#[derive(Debug, Clone)]
pub struct SummaryReport {
    pub summary: Summary,
    pub output: PathBuf,
    /// CSV digest path, set only when it was requested and written.
    pub digest: Option<PathBuf>,
    pub stats: RunStats,
}

/// Summarization service. Owns nothing between runs; every run starts from scratch.
pub struct SummarizationService {
    source: Arc<dyn RecordSource>,
    sink: Arc<dyn SummarySink>,
    digest_sink: Arc<dyn SummarySink>,
    output_dir: PathBuf,
}

impl SummarizationService {
    pub fn new(
        source: Arc<dyn RecordSource>,
        sink: Arc<dyn SummarySink>,
        digest_sink: Arc<dyn SummarySink>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source,
            sink,
            digest_sink,
            output_dir: output_dir.into(),
        }
    }

    pub fn run(&self, request: &SummaryRequest) -> Result<SummaryReport, DomainError> {
        self.run_observed(request, &NoopObserver)
    }

    /// Run with day-by-day progress reported to `observer`.
    pub fn run_observed(
        &self,
        request: &SummaryRequest,
        observer: &dyn RunObserver,
    ) -> Result<SummaryReport, DomainError> {
        let output = request.output_path(&self.output_dir);
        let mut stats = RunStats {
            days_in_range: request.day_count(),
            ..Default::default()
        };
        info!(
            kind = request.target.record_kind(),
            method = request.target.method_name(),
            start = %request.start,
            end = %request.end,
            days = stats.days_in_range,
            "grouping {} of {} from {} to {}",
            request.target.method_name(),
            request.target.record_kind(),
            request.start,
            request.end
        );

        let summary = match request.target {
            SummaryTarget::Media { kind, field } => {
                let mut grouper = HashGrouper::new(kind, field)?;
                self.drain(request, observer, &mut stats, |r| grouper.offer(r))?;
                Summary::Hashes(grouper.finish())
            }
            SummaryTarget::Text => {
                let mut clusterer = TextClusterer::new(request.min_size, request.threshold)?
                    .with_captions(request.include_captions);
                self.drain(request, observer, &mut stats, |r| clusterer.offer(r))?;
                Summary::Texts(clusterer.finish())
            }
        };
        stats.clusters = summary.cluster_count();

        self.sink.write_summary(&summary, &output)?;
        // The summary is already in place; a failed digest does not fail the run.
        let digest = match &request.digest {
            Some(path) => match self.digest_sink.write_summary(&summary, path) {
                Ok(()) => Some(path.clone()),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "digest not written");
                    None
                }
            },
            None => None,
        };

        observer.finished(&stats);
        info!(
            path = %output.display(),
            clusters = stats.clusters,
            absorbed = stats.records_absorbed,
            skipped = stats.records_skipped,
            malformed = stats.malformed_lines,
            day_files = stats.day_files_found,
            "summary complete"
        );

        Ok(SummaryReport {
            summary,
            output,
            digest,
            stats,
        })
    }

    /// Feed every record of the range to `offer`, in day order then file order.
    fn drain(
        &self,
        request: &SummaryRequest,
        observer: &dyn RunObserver,
        stats: &mut RunStats,
        mut offer: impl FnMut(MessageRecord) -> Offer,
    ) -> Result<(), DomainError> {
        for event in self.source.read_range(request.start, request.end) {
            match event? {
                SourceEvent::DayOpened { date, .. } => {
                    stats.day_files_found += 1;
                    observer.day_started(date, true);
                }
                SourceEvent::DayMissing { date } => observer.day_started(date, false),
                SourceEvent::Record(record) => {
                    stats.lines_read += 1;
                    if offer(record).is_absorbed() {
                        stats.records_absorbed += 1;
                    } else {
                        stats.records_skipped += 1;
                    }
                }
                SourceEvent::Malformed { path, line, reason } => {
                    stats.lines_read += 1;
                    stats.malformed_lines += 1;
                    warn!(path = %path.display(), line, %reason, "skipping malformed record");
                }
            }
        }
        Ok(())
    }
}
