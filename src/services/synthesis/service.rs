//! Configuration directory synthesis.
//!
//! Produces the on-disk layout the external process consumes: one file per
//! network under `networks/`, one file per monitor under `monitors/`, and
//! all resolved triggers merged into a single file under `triggers/`. When
//! no monitors exist, a minimal no-op monitor is fabricated per network
//! family so the external process pulls and tracks blocks without acting
//! on them.

use std::{
	collections::BTreeMap,
	fs,
	path::{Path, PathBuf},
};

use serde::Serialize;
use tempfile::TempDir;
use tracing::{debug, warn};

use super::error::SynthesisError;
use crate::{
	models::{
		AddressWithSpec, BlockChainType, MatchConditions, Monitor, Network, TransactionCondition,
		TransactionStatus, Trigger,
	},
	repositories::TriggerStore,
};

/// Zero address watched by the fabricated EVM monitor.
const EVM_BURN_ADDRESS: &str = "0x0000000000000000000000000000000000000000";
/// All-zero strkey watched by the fabricated Stellar monitor.
const STELLAR_BURN_ADDRESS: &str = "GAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAWHF";

const TRIGGERS_FILE: &str = "triggers.json";

/// Where synthesized configuration lands.
///
/// The ephemeral variant owns its directory and removes it on drop; the
/// persistent variant writes into the caller's configuration directory and
/// leaves untouched files alone.
pub enum ConfigDestination {
	Persistent(PathBuf),
	Ephemeral(TempDir),
}

pub struct ConfigSynthesizer {
	destination: ConfigDestination,
}

impl ConfigSynthesizer {
	/// Synthesize into a fresh temporary directory, removed at teardown.
	pub fn ephemeral() -> Result<Self, SynthesisError> {
		let dir = tempfile::Builder::new()
			.prefix("blockwatcher_")
			.tempdir()
			.map_err(|e| SynthesisError::io_error(format!("failed to create temp dir: {}", e)))?;
		Ok(ConfigSynthesizer {
			destination: ConfigDestination::Ephemeral(dir),
		})
	}

	/// Synthesize into an existing configuration directory, preserving any
	/// files this run does not touch.
	pub fn persistent(config_dir: &Path) -> Self {
		ConfigSynthesizer {
			destination: ConfigDestination::Persistent(config_dir.to_path_buf()),
		}
	}

	pub fn path(&self) -> &Path {
		match &self.destination {
			ConfigDestination::Persistent(path) => path,
			ConfigDestination::Ephemeral(dir) => dir.path(),
		}
	}

	/// Write the full configuration layout and return its root directory.
	///
	/// `store_blocks_override` only ever upgrades: a network's own
	/// `store_blocks: true` is never downgraded.
	pub fn synthesize(
		&self,
		networks: &BTreeMap<String, Network>,
		monitors: &[Monitor],
		triggers: &TriggerStore,
		store_blocks_override: bool,
	) -> Result<PathBuf, SynthesisError> {
		let root = self.path().to_path_buf();
		for subdir in ["networks", "monitors", "triggers"] {
			fs::create_dir_all(root.join(subdir))?;
		}

		for (slug, network) in networks {
			let mut network = network.clone();
			if store_blocks_override {
				network.store_blocks = Some(true);
			}
			write_json(&root.join("networks").join(format!("{}.json", slug)), &network)?;
		}

		if monitors.is_empty() {
			for monitor in default_monitors(networks) {
				write_json(
					&root.join("monitors").join(format!("{}.json", monitor.name)),
					&monitor,
				)?;
			}
		} else {
			for monitor in monitors {
				write_json(
					&root.join("monitors").join(format!("{}.json", monitor.name)),
					monitor,
				)?;
			}
		}

		// The external process requires the triggers directory and a
		// parseable file even when nothing resolved.
		let merged = merge_triggers(monitors, triggers);
		write_json(&root.join("triggers").join(TRIGGERS_FILE), &merged)?;

		debug!("synthesized configuration in {}", root.display());
		Ok(root)
	}
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), SynthesisError> {
	let rendered = serde_json::to_string_pretty(value)?;
	fs::write(path, rendered)?;
	Ok(())
}

/// Fabricate one minimal no-op monitor per network family present.
///
/// Each watches the family's conventional burn address and matches only
/// successful transactions with no expression filter, carrying no triggers.
fn default_monitors(networks: &BTreeMap<String, Network>) -> Vec<Monitor> {
	let mut by_type: BTreeMap<BlockChainType, Vec<String>> = BTreeMap::new();
	for (slug, network) in networks {
		by_type
			.entry(network.network_type)
			.or_default()
			.push(slug.clone());
	}

	by_type
		.into_iter()
		.map(|(network_type, slugs)| {
			let (name, address) = match network_type {
				BlockChainType::EVM => ("blockwatcher_evm", EVM_BURN_ADDRESS),
				BlockChainType::Stellar => ("blockwatcher_stellar", STELLAR_BURN_ADDRESS),
			};
			Monitor {
				name: name.to_string(),
				paused: false,
				networks: slugs,
				addresses: vec![AddressWithSpec {
					address: address.to_string(),
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
			}
		})
		.collect()
}

/// Resolve every distinct trigger reference across the supplied monitors
/// into one slug-keyed mapping. Unresolved references are reported and
/// omitted; the monitor files keep the original reference either way.
fn merge_triggers(monitors: &[Monitor], triggers: &TriggerStore) -> BTreeMap<String, Trigger> {
	let mut merged = BTreeMap::new();
	for monitor in monitors {
		for reference in &monitor.triggers {
			match triggers.resolve(reference) {
				Some(record) => {
					merged
						.entry(record.slug.clone())
						.or_insert_with(|| record.trigger.clone());
				}
				None => warn!(
					"monitor '{}' references unknown trigger '{}', omitting it from the synthesized config",
					monitor.name,
					reference.key()
				),
			}
		}
	}
	merged
}
