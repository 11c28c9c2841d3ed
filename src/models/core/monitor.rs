use serde::{Deserialize, Serialize};

/// A watch definition handed to the external process. The runner either
/// passes these through from the relational store or fabricates minimal
/// no-op variants per network family.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Monitor {
	pub name: String,
	pub paused: bool,
	pub networks: Vec<String>,
	pub addresses: Vec<AddressWithSpec>,
	pub match_conditions: MatchConditions,
	pub trigger_conditions: Vec<serde_json::Value>,
	pub triggers: Vec<TriggerRef>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AddressWithSpec {
	pub address: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub abi: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MatchConditions {
	pub functions: Vec<FunctionCondition>,
	pub events: Vec<EventCondition>,
	pub transactions: Vec<TransactionCondition>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FunctionCondition {
	pub signature: String,
	pub expression: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EventCondition {
	pub signature: String,
	pub expression: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionCondition {
	pub status: TransactionStatus,
	pub expression: Option<String>,
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq)]
pub enum TransactionStatus {
	Any,
	Success,
	Failure,
}

/// A reference from a monitor to a trigger, either by slug or by id.
/// Relational rows store a mix of bare strings and `{"id": ...}` objects.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(untagged)]
pub enum TriggerRef {
	Slug(String),
	Id { id: String },
}

impl TriggerRef {
	/// The raw key carried by this reference, whichever form it takes.
	pub fn key(&self) -> &str {
		match self {
			Self::Slug(slug) => slug,
			Self::Id { id } => id,
		}
	}
}
