//! Test helper utilities for Monitor configuration
//!
//! - `MonitorBuilder`: Builder for creating test Monitor instances

use crate::models::{
	AddressWithSpec, MatchConditions, Monitor, TransactionCondition, TransactionStatus, TriggerRef,
};

/// Builder for creating test Monitor instances
pub struct MonitorBuilder {
	monitor: Monitor,
}

impl Default for MonitorBuilder {
	fn default() -> Self {
		Self {
			monitor: Monitor {
				name: "test_monitor".to_string(),
				paused: false,
				networks: vec!["ethereum_mainnet".to_string()],
				addresses: vec![AddressWithSpec {
					address: "0x0000000000000000000000000000000000000000".to_string(),
					abi: None,
				}],
				match_conditions: MatchConditions {
					functions: vec![],
					events: vec![],
					transactions: vec![TransactionCondition {
						status: TransactionStatus::Success,
						expression: None,
					}],
				},
				trigger_conditions: vec![],
				triggers: vec![],
			},
		}
	}
}

impl MonitorBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn name(mut self, name: &str) -> Self {
		self.monitor.name = name.to_string();
		self
	}

	pub fn networks(mut self, networks: Vec<&str>) -> Self {
		self.monitor.networks = networks.into_iter().map(|n| n.to_string()).collect();
		self
	}

	pub fn trigger_slug(mut self, slug: &str) -> Self {
		self.monitor.triggers.push(TriggerRef::Slug(slug.to_string()));
		self
	}

	pub fn trigger_id(mut self, id: &str) -> Self {
		self.monitor.triggers.push(TriggerRef::Id { id: id.to_string() });
		self
	}

	pub fn build(self) -> Monitor {
		self.monitor
	}
}
