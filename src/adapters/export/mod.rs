//! Secondary exports derived from a finished summary.

pub mod csv_digest;

pub use csv_digest::{CsvDigestWriter, digest_to_csv};
