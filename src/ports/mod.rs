//! Port traits. API boundaries for the hexagon.
//!
//! - Outbound: Called by application into infrastructure (day files, output, progress)

pub mod outbound;

pub use outbound::{
    NoopObserver, RecordSource, RecordStream, RunObserver, SourceEvent, SummarySink,
};
