//! Core domain layer. No external I/O dependencies.
//!
//! Records, clusters and the grouping/clustering rules live here. Dependencies flow inward.

pub mod clustering;
pub mod clusters;
pub mod dates;
pub mod entities;
pub mod errors;
pub mod grouping;
pub mod similarity;

pub use clustering::{TextClusterer, DEFAULT_MIN_SIZE, DEFAULT_THRESHOLD};
pub use clusters::{DigestRow, HashCluster, HashSummary, Summary, TextCluster, TextSummary};
pub use entities::{HashField, MediaKind, MessageRecord, Sender, SummaryTarget};
pub use errors::DomainError;
pub use grouping::{HashGrouper, Offer, SkipReason};
