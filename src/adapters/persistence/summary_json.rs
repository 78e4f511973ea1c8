//! Implements SummarySink as one pretty-printed JSON document (4-space indent).

use crate::adapters::persistence::atomic::write_replace;
use crate::domain::{DomainError, Summary};
use crate::ports::SummarySink;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::path::Path;
use tracing::info;

const INDENT: &[u8] = b"    ";

/// JSON file writer for the final summary.
#[derive(Debug, Default)]
pub struct SummaryJsonWriter;

impl SummaryJsonWriter {
    pub fn new() -> Self {
        Self
    }

    /// Render the whole document in memory so nothing touches disk until it is complete.
    pub fn render(summary: &Summary) -> Result<Vec<u8>, DomainError> {
        let mut buf = Vec::new();
        let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(INDENT));
        summary
            .serialize(&mut ser)
            .map_err(|e| DomainError::Write(e.to_string()))?;
        Ok(buf)
    }
}

impl SummarySink for SummaryJsonWriter {
    fn write_summary(&self, summary: &Summary, output: &Path) -> Result<(), DomainError> {
        let bytes = Self::render(summary)?;
        write_replace(output, &bytes)?;
        info!(
            path = %output.display(),
            clusters = summary.cluster_count(),
            bytes = bytes.len(),
            "wrote summary (JSON)"
        );
        Ok(())
    }
}
