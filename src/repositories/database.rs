//! Relational configuration source.
//!
//! Loads network, monitor, and trigger records from a tenant-scoped
//! PostgreSQL schema (`networks`, `monitors`, `triggers` plus per-type
//! detail tables). Network loading failures are returned to the caller and
//! treated as fatal by the orchestrator; monitor/trigger loading failures
//! are returned as ordinary errors so the run can continue with fabricated
//! defaults.
//!
//! RPC endpoint columns arrive in a mix of historical shapes (plain
//! strings, flat objects, nested value objects) and are normalized into the
//! single canonical shape the external process understands.

use std::{
	collections::{BTreeMap, HashSet},
	str::FromStr,
};

use async_trait::async_trait;
use email_address::EmailAddress;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
	models::{
		BlockChainType, ConfigLoader, MatchConditions, Monitor, Network, NotificationMessage,
		RpcUrl, SecretValue, Trigger, TriggerRecord, TriggerRef, TriggerType, TriggerTypeConfig,
	},
	repositories::{
		error::RepositoryError,
		network::{filter_selection, NetworkRepositoryTrait},
		trigger::TriggerStore,
	},
};

const DEFAULT_RPC_WEIGHT: u32 = 100;

/// Tenant-scoped PostgreSQL configuration source.
///
/// Cheaply cloneable; wraps a connection pool internally.
#[derive(Clone)]
pub struct DatabaseRepository {
	pool: PgPool,
	tenant_id: Uuid,
}

impl DatabaseRepository {
	/// Connect to the configuration database.
	///
	/// The URL follows libpq convention:
	/// `postgres://[user[:password]@][host][:port][/dbname]`
	pub async fn connect(database_url: &str, tenant_id: Uuid) -> Result<Self, RepositoryError> {
		let pool = PgPoolOptions::new()
			.max_connections(5)
			.connect(database_url)
			.await
			.map_err(|e| {
				RepositoryError::connection_error(format!("postgres connect: {}", e))
			})?;

		debug!("connected to configuration database");
		Ok(DatabaseRepository { pool, tenant_id })
	}

	/// Load active, non-paused monitors for the tenant together with every
	/// trigger their references resolve to.
	///
	/// Trigger references are collected across all monitors into one
	/// deduplicated working set, resolved against the `triggers` table by
	/// slug or id, then joined with their per-type detail rows. References
	/// whose trigger or detail row is missing simply produce no record; the
	/// synthesizer reports them when it fails to resolve the reference.
	pub async fn load_monitors_and_triggers(
		&self,
	) -> Result<(Vec<Monitor>, TriggerStore), RepositoryError> {
		let rows = sqlx::query(
			"SELECT slug, paused, networks, addresses, match_functions, match_events,
			        match_transactions, trigger_conditions, triggers
			 FROM monitors
			 WHERE tenant_id = $1
			   AND active = true
			   AND paused = false
			   AND deleted_at IS NULL",
		)
		.bind(self.tenant_id)
		.fetch_all(&self.pool)
		.await?;

		let mut monitors = Vec::new();
		for row in &rows {
			match monitor_from_row(row) {
				Ok(monitor) => monitors.push(monitor),
				Err(e) => warn!("skipping monitor row: {}", e),
			}
		}

		let mut seen = HashSet::new();
		let references: Vec<String> = monitors
			.iter()
			.flat_map(|m| m.triggers.iter())
			.map(|r| r.key().to_string())
			.filter(|key| seen.insert(key.clone()))
			.collect();

		let mut store = TriggerStore::new();
		if references.is_empty() {
			return Ok((monitors, store));
		}

		let trigger_rows = sqlx::query(
			"SELECT id, name, slug, trigger_type
			 FROM triggers
			 WHERE (slug = ANY($1) OR id::text = ANY($1))
			   AND tenant_id = $2
			   AND active = true
			   AND deleted_at IS NULL",
		)
		.bind(&references)
		.bind(self.tenant_id)
		.fetch_all(&self.pool)
		.await?;

		for row in &trigger_rows {
			let id: Uuid = row.try_get("id").map_err(db_error)?;
			let name: String = row.try_get("name").map_err(db_error)?;
			let slug: String = row.try_get("slug").map_err(db_error)?;
			let trigger_type: String = row.try_get("trigger_type").map_err(db_error)?;

			let trigger = match trigger_type.as_str() {
				"email" => self.load_email_trigger(id, &name).await?,
				"webhook" => self.load_webhook_trigger(id, &name).await?,
				other => {
					warn!("trigger '{}' has unsupported type '{}'", slug, other);
					None
				}
			};

			if let Some(trigger) = trigger {
				store.insert(TriggerRecord {
					id: id.to_string(),
					slug,
					trigger,
				});
			} else {
				warn!("trigger '{}' has no detail record, skipping", slug);
			}
		}

		debug!(
			"loaded {} monitors and {} triggers from database",
			monitors.len(),
			store.len()
		);
		Ok((monitors, store))
	}

	async fn load_email_trigger(
		&self,
		trigger_id: Uuid,
		name: &str,
	) -> Result<Option<Trigger>, RepositoryError> {
		let row = sqlx::query(
			"SELECT host, port, username_value, password_value, sender, recipients,
			        message_title, message_body
			 FROM email_triggers
			 WHERE trigger_id = $1",
		)
		.bind(trigger_id)
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};

		let sender: String = row.try_get("sender").map_err(db_error)?;
		let sender = match EmailAddress::from_str(&sender) {
			Ok(address) => address,
			Err(e) => {
				warn!("trigger '{}' has invalid sender '{}': {}", name, sender, e);
				return Ok(None);
			}
		};

		let raw_recipients: Vec<String> = row.try_get("recipients").map_err(db_error)?;
		let recipients: Vec<EmailAddress> = raw_recipients
			.iter()
			.filter_map(|r| match EmailAddress::from_str(r) {
				Ok(address) => Some(address),
				Err(e) => {
					warn!("trigger '{}' has invalid recipient '{}': {}", name, r, e);
					None
				}
			})
			.collect();

		let port: Option<i32> = row.try_get("port").map_err(db_error)?;

		Ok(Some(Trigger {
			name: name.to_string(),
			trigger_type: TriggerType::Email,
			config: TriggerTypeConfig::Email {
				host: row.try_get("host").map_err(db_error)?,
				port: port.map(|p| p as u16),
				username: SecretValue::Plain(row.try_get("username_value").map_err(db_error)?),
				password: SecretValue::Plain(row.try_get("password_value").map_err(db_error)?),
				sender,
				recipients,
				message: NotificationMessage {
					title: row.try_get("message_title").map_err(db_error)?,
					body: row.try_get("message_body").map_err(db_error)?,
				},
			},
		}))
	}

	async fn load_webhook_trigger(
		&self,
		trigger_id: Uuid,
		name: &str,
	) -> Result<Option<Trigger>, RepositoryError> {
		let row = sqlx::query(
			"SELECT url_value, method, headers, secret_value, message_title, message_body
			 FROM webhook_triggers
			 WHERE trigger_id = $1",
		)
		.bind(trigger_id)
		.fetch_optional(&self.pool)
		.await?;

		let Some(row) = row else {
			return Ok(None);
		};

		let headers: Option<Value> = row.try_get("headers").map_err(db_error)?;
		let headers = match headers {
			Some(Value::Null) | None => None,
			Some(value) => serde_json::from_value(value).map_err(|e| {
				RepositoryError::load_error(format!("trigger '{}' headers: {}", name, e))
			})?,
		};

		let secret: Option<String> = row.try_get("secret_value").map_err(db_error)?;

		Ok(Some(Trigger {
			name: name.to_string(),
			trigger_type: TriggerType::Webhook,
			config: TriggerTypeConfig::Webhook {
				url: SecretValue::Plain(row.try_get("url_value").map_err(db_error)?),
				method: row.try_get("method").map_err(db_error)?,
				headers,
				secret: secret.map(SecretValue::Plain),
				message: NotificationMessage {
					title: row.try_get("message_title").map_err(db_error)?,
					body: row.try_get("message_body").map_err(db_error)?,
				},
			},
		}))
	}
}

#[async_trait]
impl NetworkRepositoryTrait for DatabaseRepository {
	async fn load_networks(
		&self,
		selection: &[String],
	) -> Result<BTreeMap<String, Network>, RepositoryError> {
		let query = if selection.is_empty() {
			sqlx::query(
				"SELECT name, slug, network_type, chain_id, network_passphrase, rpc_urls,
				        block_time_ms, confirmation_blocks, cron_schedule, max_past_blocks,
				        store_blocks
				 FROM networks
				 WHERE tenant_id = $1
				   AND active = true
				   AND deleted_at IS NULL",
			)
			.bind(self.tenant_id)
		} else {
			sqlx::query(
				"SELECT name, slug, network_type, chain_id, network_passphrase, rpc_urls,
				        block_time_ms, confirmation_blocks, cron_schedule, max_past_blocks,
				        store_blocks
				 FROM networks
				 WHERE tenant_id = $1
				   AND active = true
				   AND deleted_at IS NULL
				   AND slug = ANY($2)",
			)
			.bind(self.tenant_id)
			.bind(selection.to_vec())
		};

		let rows = query.fetch_all(&self.pool).await?;

		let mut networks = BTreeMap::new();
		for row in &rows {
			match network_from_row(row) {
				Ok(network) => {
					// Same parse-boundary validation as the file backend
					if let Err(e) = network.validate() {
						warn!("skipping network '{}': {}", network.slug, e);
						continue;
					}
					networks.insert(network.slug.clone(), network);
				}
				Err(e) => warn!("skipping network row: {}", e),
			}
		}

		filter_selection(networks, selection)
	}
}

fn db_error(err: sqlx::Error) -> RepositoryError {
	RepositoryError::load_error(err.to_string())
}

fn network_from_row(row: &sqlx::postgres::PgRow) -> Result<Network, RepositoryError> {
	let slug: String = row.try_get("slug").map_err(db_error)?;
	let network_type: String = row.try_get("network_type").map_err(db_error)?;
	let network_type = match network_type.as_str() {
		"EVM" => BlockChainType::EVM,
		"Stellar" => BlockChainType::Stellar,
		other => {
			return Err(RepositoryError::validation_error(format!(
				"network '{}' has unsupported type '{}'",
				slug, other
			)))
		}
	};

	let rpc_urls: Value = row.try_get("rpc_urls").map_err(db_error)?;
	let chain_id: Option<i64> = row.try_get("chain_id").map_err(db_error)?;
	let block_time_ms: i64 = row.try_get("block_time_ms").map_err(db_error)?;
	let confirmation_blocks: i64 = row.try_get("confirmation_blocks").map_err(db_error)?;
	let max_past_blocks: Option<i64> = row.try_get("max_past_blocks").map_err(db_error)?;

	Ok(Network {
		network_type,
		slug,
		name: row.try_get("name").map_err(db_error)?,
		rpc_urls: normalize_rpc_urls(&rpc_urls),
		chain_id: chain_id.map(|id| id as u64),
		network_passphrase: row.try_get("network_passphrase").map_err(db_error)?,
		block_time_ms: block_time_ms as u64,
		confirmation_blocks: confirmation_blocks as u64,
		cron_schedule: row.try_get("cron_schedule").map_err(db_error)?,
		max_past_blocks: max_past_blocks.map(|b| b as u64),
		store_blocks: row.try_get("store_blocks").map_err(db_error)?,
	})
}

fn monitor_from_row(row: &sqlx::postgres::PgRow) -> Result<Monitor, RepositoryError> {
	let slug: String = row.try_get("slug").map_err(db_error)?;

	Ok(Monitor {
		name: slug.clone(),
		paused: row.try_get("paused").map_err(db_error)?,
		networks: json_column(row, "networks", &slug)?,
		addresses: json_column(row, "addresses", &slug)?,
		match_conditions: MatchConditions {
			functions: json_column(row, "match_functions", &slug)?,
			events: json_column(row, "match_events", &slug)?,
			transactions: json_column(row, "match_transactions", &slug)?,
		},
		trigger_conditions: json_column(row, "trigger_conditions", &slug)?,
		triggers: json_column::<Vec<TriggerRef>>(row, "triggers", &slug)?,
	})
}

/// Decode a JSONB column into a typed value; a SQL NULL decodes as the
/// type's empty form via `Value::Null` handling in serde defaults.
fn json_column<T: serde::de::DeserializeOwned + Default>(
	row: &sqlx::postgres::PgRow,
	column: &str,
	slug: &str,
) -> Result<T, RepositoryError> {
	let value: Option<Value> = row.try_get(column).map_err(db_error)?;
	match value {
		None | Some(Value::Null) => Ok(T::default()),
		Some(value) => serde_json::from_value(value).map_err(|e| {
			RepositoryError::load_error(format!("monitor '{}' column '{}': {}", slug, column, e))
		}),
	}
}

/// Normalize a raw RPC endpoint column into the canonical endpoint list.
///
/// Accepts plain string entries, flat `{url, weight}` objects, and nested
/// `{url: {value}}` objects; anything else is dropped. Weight defaults to
/// 100. Already-canonical entries pass through unchanged, so normalization
/// is idempotent.
pub fn normalize_rpc_urls(raw: &Value) -> Vec<RpcUrl> {
	let Some(entries) = raw.as_array() else {
		return Vec::new();
	};
	entries.iter().filter_map(normalize_rpc_url).collect()
}

fn normalize_rpc_url(raw: &Value) -> Option<RpcUrl> {
	if let Ok(canonical) = serde_json::from_value::<RpcUrl>(raw.clone()) {
		return Some(canonical);
	}

	match raw {
		Value::String(url) => Some(RpcUrl {
			type_: "rpc".to_string(),
			url: SecretValue::Plain(url.clone()),
			weight: DEFAULT_RPC_WEIGHT,
		}),
		Value::Object(entry) => {
			let weight = entry
				.get("weight")
				.and_then(Value::as_u64)
				.unwrap_or(DEFAULT_RPC_WEIGHT as u64) as u32;

			let value = match entry.get("url")? {
				Value::String(url) => url.clone(),
				Value::Object(nested) => nested.get("value")?.as_str()?.to_string(),
				_ => return None,
			};

			Some(RpcUrl {
				type_: "rpc".to_string(),
				url: SecretValue::Plain(value),
				weight,
			})
		}
		_ => None,
	}
}
