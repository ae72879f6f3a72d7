//! Scoring, visibility filtering and points aggregation for dog-agility
//! trial records.

pub mod config;
pub mod document;
pub mod error;
pub mod filter;
pub mod report;
pub mod runs;
pub mod scoring;
pub mod telemetry;
