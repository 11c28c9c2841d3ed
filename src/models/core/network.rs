use serde::{Deserialize, Serialize};

/// Blockchain families the external process can watch.
#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum BlockChainType {
	EVM,
	Stellar,
}

/// A value that is either inlined or resolved from the environment by the
/// external process. Serializes as `{"type": "plain", "value": "..."}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum SecretValue {
	Plain(String),
	Environment(String),
}

impl SecretValue {
	/// The inlined value, if this is a plain secret.
	pub fn as_plain(&self) -> Option<&str> {
		match self {
			Self::Plain(value) => Some(value),
			Self::Environment(_) => None,
		}
	}
}

/// A weighted RPC endpoint in the canonical shape the external process
/// expects: `{"type_": "rpc", "url": {"type": "plain", "value": ...}, "weight": 100}`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RpcUrl {
	pub type_: String,
	pub url: SecretValue,
	pub weight: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Network {
	pub network_type: BlockChainType,
	#[serde(default)]
	pub slug: String,
	pub name: String,
	pub rpc_urls: Vec<RpcUrl>,
	pub chain_id: Option<u64>,
	pub network_passphrase: Option<String>,
	pub block_time_ms: u64,
	pub confirmation_blocks: u64,
	pub cron_schedule: String,
	pub max_past_blocks: Option<u64>,
	pub store_blocks: Option<bool>,
}
