//! File-backed adapters: day-file reader and atomic summary writer.

pub mod atomic;
pub mod day_files;
pub mod summary_json;

pub use day_files::DayFileReader;
pub use summary_json::SummaryJsonWriter;
