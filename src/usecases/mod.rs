//! Application use cases. Orchestrate domain logic via ports.

pub mod summarize_service;

pub use summarize_service::{
    RequestOverrides, RunStats, SummarizationService, SummaryReport, SummaryRequest,
};
