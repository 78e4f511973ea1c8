//! Infrastructure adapters. Implement outbound ports.
//!
//! Day files, JSON/CSV output, terminal progress. Map errors to DomainError.

pub mod export;
pub mod persistence;
pub mod ui;
