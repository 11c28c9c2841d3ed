use std::{collections::BTreeMap, fs, path::Path};

use blockwatcher_runner::{
	models::{BlockChainType, Network, TriggerRecord},
	repositories::TriggerStore,
	services::synthesis::ConfigSynthesizer,
	utils::tests::builders::{
		monitor::MonitorBuilder, network::NetworkBuilder, trigger::TriggerBuilder,
	},
};

fn mixed_networks() -> BTreeMap<String, Network> {
	let mut networks = BTreeMap::new();
	networks.insert(
		"ethereum_mainnet".to_string(),
		NetworkBuilder::new()
			.slug("ethereum_mainnet")
			.network_type(BlockChainType::EVM)
			.build(),
	);
	networks.insert(
		"stellar_mainnet".to_string(),
		NetworkBuilder::new()
			.slug("stellar_mainnet")
			.network_type(BlockChainType::Stellar)
			.build(),
	);
	networks
}

fn json_files(dir: &Path) -> Vec<String> {
	let mut names: Vec<String> = fs::read_dir(dir)
		.unwrap()
		.map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
		.filter(|name| name.ends_with(".json"))
		.collect();
	names.sort();
	names
}

#[test]
fn test_no_monitors_yields_one_default_per_family_and_empty_triggers() {
	let synthesizer = ConfigSynthesizer::ephemeral().unwrap();
	let root = synthesizer
		.synthesize(&mixed_networks(), &[], &TriggerStore::new(), false)
		.unwrap();

	assert_eq!(
		json_files(&root.join("networks")),
		vec!["ethereum_mainnet.json", "stellar_mainnet.json"]
	);
	assert_eq!(
		json_files(&root.join("monitors")),
		vec!["blockwatcher_evm.json", "blockwatcher_stellar.json"]
	);

	// Exactly one trigger file, parseable and empty
	assert_eq!(json_files(&root.join("triggers")).len(), 1);
	let triggers: serde_json::Value =
		serde_json::from_str(&fs::read_to_string(root.join("triggers/triggers.json")).unwrap())
			.unwrap();
	assert_eq!(triggers, serde_json::json!({}));

	// Each default monitor carries no triggers and only watches its family
	let evm: serde_json::Value =
		serde_json::from_str(&fs::read_to_string(root.join("monitors/blockwatcher_evm.json")).unwrap())
			.unwrap();
	assert_eq!(evm["networks"], serde_json::json!(["ethereum_mainnet"]));
	assert_eq!(evm["triggers"], serde_json::json!([]));
	assert_eq!(evm["paused"], serde_json::json!(false));
}

#[test]
fn test_unresolvable_reference_kept_in_monitor_dropped_from_merge() {
	let mut store = TriggerStore::new();
	store.insert(TriggerRecord {
		id: "11111111-2222-3333-4444-555555555555".to_string(),
		slug: "ops_webhook".to_string(),
		trigger: TriggerBuilder::new()
			.name("ops_webhook")
			.webhook("https://hooks.example.com/ops")
			.build(),
	});

	let monitor = MonitorBuilder::new()
		.name("transfers")
		.trigger_slug("ops_webhook")
		.trigger_slug("ghost_trigger")
		.build();

	let synthesizer = ConfigSynthesizer::ephemeral().unwrap();
	let root = synthesizer
		.synthesize(&mixed_networks(), &[monitor], &store, false)
		.unwrap();

	let written: serde_json::Value =
		serde_json::from_str(&fs::read_to_string(root.join("monitors/transfers.json")).unwrap())
			.unwrap();
	assert_eq!(
		written["triggers"],
		serde_json::json!(["ops_webhook", "ghost_trigger"])
	);

	let merged: serde_json::Value =
		serde_json::from_str(&fs::read_to_string(root.join("triggers/triggers.json")).unwrap())
			.unwrap();
	let merged = merged.as_object().unwrap();
	assert!(merged.contains_key("ops_webhook"));
	assert!(!merged.contains_key("ghost_trigger"));
	assert_eq!(merged.len(), 1);
}

#[test]
fn test_id_reference_resolves_into_merged_file() {
	let mut store = TriggerStore::new();
	store.insert(TriggerRecord {
		id: "11111111-2222-3333-4444-555555555555".to_string(),
		slug: "ops_email".to_string(),
		trigger: TriggerBuilder::new()
			.name("ops_email")
			.email("smtp.example.com", "alerts@example.com", vec!["oncall@example.com"])
			.build(),
	});

	let monitor = MonitorBuilder::new()
		.name("transfers")
		.trigger_id("11111111-2222-3333-4444-555555555555")
		.build();

	let synthesizer = ConfigSynthesizer::ephemeral().unwrap();
	let root = synthesizer
		.synthesize(&mixed_networks(), &[monitor], &store, false)
		.unwrap();

	let merged: serde_json::Value =
		serde_json::from_str(&fs::read_to_string(root.join("triggers/triggers.json")).unwrap())
			.unwrap();
	// Merged file is keyed by slug regardless of how the monitor referenced it
	assert!(merged.as_object().unwrap().contains_key("ops_email"));
	assert_eq!(merged["ops_email"]["trigger_type"], "email");
}

#[test]
fn test_synthesis_is_byte_identical_across_runs() {
	let networks = mixed_networks();
	let mut store = TriggerStore::new();
	store.insert(TriggerRecord {
		id: "11111111-2222-3333-4444-555555555555".to_string(),
		slug: "ops_webhook".to_string(),
		trigger: TriggerBuilder::new()
			.name("ops_webhook")
			.webhook("https://hooks.example.com/ops")
			.build(),
	});
	let monitors = vec![MonitorBuilder::new()
		.name("transfers")
		.trigger_slug("ops_webhook")
		.build()];

	let first = ConfigSynthesizer::ephemeral().unwrap();
	let second = ConfigSynthesizer::ephemeral().unwrap();
	let first_root = first.synthesize(&networks, &monitors, &store, true).unwrap();
	let second_root = second.synthesize(&networks, &monitors, &store, true).unwrap();

	for subdir in ["networks", "monitors", "triggers"] {
		let names = json_files(&first_root.join(subdir));
		assert_eq!(names, json_files(&second_root.join(subdir)));
		for name in names {
			let a = fs::read(first_root.join(subdir).join(&name)).unwrap();
			let b = fs::read(second_root.join(subdir).join(&name)).unwrap();
			assert_eq!(a, b, "{}/{} differs between runs", subdir, name);
		}
	}
}

#[test]
fn test_persistent_destination_preserves_untouched_files() {
	let config_dir = tempfile::tempdir().unwrap();
	fs::create_dir_all(config_dir.path().join("monitors")).unwrap();
	fs::write(
		config_dir.path().join("monitors/handwritten.json"),
		"{\"name\": \"handwritten\"}",
	)
	.unwrap();

	let synthesizer = ConfigSynthesizer::persistent(config_dir.path());
	let root = synthesizer
		.synthesize(&mixed_networks(), &[], &TriggerStore::new(), false)
		.unwrap();

	assert_eq!(root, config_dir.path());
	assert!(config_dir.path().join("monitors/handwritten.json").exists());
	assert!(config_dir.path().join("monitors/blockwatcher_evm.json").exists());

	// Persistent output survives the synthesizer itself
	drop(synthesizer);
	assert!(config_dir.path().join("networks/ethereum_mainnet.json").exists());
}
