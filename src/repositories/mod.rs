//! Configuration sources for networks, monitors, and triggers.
//!
//! Two backends share one loading contract: a flat-file directory of JSON
//! records and a tenant-scoped relational store. Monitors and triggers are
//! only available from the relational backend.

mod database;
mod error;
mod network;
mod trigger;

pub use database::{normalize_rpc_urls, DatabaseRepository};
pub use error::RepositoryError;
pub use network::{FileNetworkRepository, NetworkRepositoryTrait};
pub use trigger::TriggerStore;
