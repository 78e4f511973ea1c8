//! tg-summary: deduplication and clustering of collected Telegram message logs,
//! with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
