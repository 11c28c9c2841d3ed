//! Supervisor for running the OpenZeppelin Monitor binary in
//! blockwatcher-only mode.
//!
//! The external process does all the blockchain work; this crate only
//! prepares the configuration it needs, keeps it alive, and watches the
//! files it writes:
//!
//! - `models`: typed network/monitor/trigger records and their file formats
//! - `repositories`: configuration sources (flat files or PostgreSQL)
//! - `services`: config synthesis, process supervision, progress tracking
//! - `bootstrap`: composition of one supervised run
//! - `utils`: logging setup and test builders

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
