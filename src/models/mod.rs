//! Domain models and data structures for the blockwatcher runner.
//!
//! - `config`: configuration file loading and validation
//! - `core`: core domain models (Network, Monitor, Trigger)

mod config;
mod core;

pub use self::core::{
	AddressWithSpec, BlockChainType, EventCondition, FunctionCondition, MatchConditions, Monitor,
	Network, NotificationMessage, RpcUrl, SecretValue, TransactionCondition, TransactionStatus,
	Trigger, TriggerRecord, TriggerRef, TriggerType, TriggerTypeConfig,
};

pub use config::{ConfigError, ConfigLoader};
