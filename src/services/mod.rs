//! Core services for the blockwatcher runner.
//!
//! - `synthesis`: renders the configuration directory the external process reads
//! - `supervisor`: owns the external process lifecycle
//! - `progress`: polls the data directory for block progress statistics

pub mod progress;
pub mod supervisor;
pub mod synthesis;
