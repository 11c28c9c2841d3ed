use std::collections::BTreeMap;

use email_address::EmailAddress;
use serde::{Deserialize, Serialize};

use crate::models::SecretValue;

/// A notification action definition in the wire shape the external process
/// consumes. The runner never delivers notifications itself; it only ships
/// these definitions.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Trigger {
	pub name: String,
	pub trigger_type: TriggerType,
	pub config: TriggerTypeConfig,
}

#[derive(Debug, Copy, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TriggerType {
	Email,
	Webhook,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum TriggerTypeConfig {
	Email {
		host: String,
		port: Option<u16>,
		username: SecretValue,
		password: SecretValue,
		sender: EmailAddress,
		recipients: Vec<EmailAddress>,
		message: NotificationMessage,
	},
	Webhook {
		url: SecretValue,
		method: Option<String>,
		// BTreeMap keeps synthesized trigger files byte-stable across runs
		headers: Option<BTreeMap<String, String>>,
		#[serde(skip_serializing_if = "Option::is_none")]
		secret: Option<SecretValue>,
		message: NotificationMessage,
	},
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotificationMessage {
	pub title: String,
	pub body: String,
}

/// A trigger as loaded from the relational store, carrying both of its
/// addressable identities alongside the wire definition.
#[derive(Debug, Clone)]
pub struct TriggerRecord {
	pub id: String,
	pub slug: String,
	pub trigger: Trigger,
}
