//! Core domain models for the blockwatcher runner.
//!
//! This module contains the fundamental data structures that represent:
//! - Networks: blockchain network definitions handed to the external process
//! - Monitors: watch definitions, either passed through or fabricated
//! - Triggers: notification action definitions referenced by monitors

mod monitor;
mod network;
mod trigger;

pub use monitor::{
	AddressWithSpec, EventCondition, FunctionCondition, MatchConditions, Monitor,
	TransactionCondition, TransactionStatus, TriggerRef,
};
pub use network::{BlockChainType, Network, RpcUrl, SecretValue};
pub use trigger::{NotificationMessage, Trigger, TriggerRecord, TriggerType, TriggerTypeConfig};
