//! Anonymous poll voting engine.
//!
//! Polls are owned by an administrative collaborator and exposed read-only through
//! [`polls::PollCatalog`]. This crate validates votes against a poll's configuration, records
//! accepted votes per respondent, and aggregates the per-respondent view returned to callers.

pub mod config;
pub mod error;
pub mod polls;
pub mod telemetry;
