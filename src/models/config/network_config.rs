//! Network configuration loading and validation.
//!
//! Implements the [`ConfigLoader`] trait for [`Network`], reading one JSON
//! file per network from a directory. A file's own `slug` field is its key;
//! when the field is absent the file stem is used instead.

use std::path::Path;

use tracing::warn;

use crate::models::{ConfigLoader, Network, SecretValue};

use super::error::ConfigError;

impl ConfigLoader for Network {
	fn load_all<T>(path: &Path) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		if !path.exists() {
			return Err(ConfigError::file_error(format!(
				"networks directory not found: {}",
				path.display()
			)));
		}

		let mut pairs = Vec::new();
		for entry in std::fs::read_dir(path)? {
			let entry = entry?;
			let file_path = entry.path();

			if !Self::is_json_file(&file_path) {
				continue;
			}

			let stem = file_path
				.file_stem()
				.and_then(|s| s.to_str())
				.unwrap_or("unknown")
				.to_string();

			let mut network = match Self::load_from_path(&file_path) {
				Ok(network) => network,
				Err(e) => {
					warn!("skipping network config {}: {}", file_path.display(), e);
					continue;
				}
			};

			if network.slug.is_empty() {
				network.slug = stem;
			}

			if let Err(e) = network.validate() {
				warn!("skipping network config {}: {}", file_path.display(), e);
				continue;
			}

			pairs.push((network.slug.clone(), network));
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path)?;
		let config: Network = serde_json::from_reader(file)?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		// Validate slug
		if self.slug.is_empty() {
			return Err("Slug cannot be empty".to_string());
		}
		if !self
			.slug
			.chars()
			.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
		{
			return Err(
				"Slug must contain only lowercase letters, numbers, and underscores".to_string(),
			);
		}

		// Validate RPC URLs
		if self.rpc_urls.is_empty() {
			return Err("At least one RPC URL is required".to_string());
		}

		let supported_types = ["rpc"];
		if !self
			.rpc_urls
			.iter()
			.all(|rpc_url| supported_types.contains(&rpc_url.type_.as_str()))
		{
			return Err(format!(
				"RPC URL type must be one of: {}",
				supported_types.join(", ")
			));
		}

		if !self.rpc_urls.iter().all(|rpc_url| match &rpc_url.url {
			SecretValue::Plain(value) => {
				value.starts_with("http://") || value.starts_with("https://")
			}
			// Resolved by the external process; nothing to check here
			SecretValue::Environment(_) => true,
		}) {
			return Err("All RPC URLs must start with http:// or https://".to_string());
		}

		if !self.rpc_urls.iter().all(|rpc_url| rpc_url.weight <= 100) {
			return Err("All RPC URL weights must be between 0 and 100".to_string());
		}

		// Validate block time
		if self.block_time_ms < 100 {
			return Err("Block time must be at least 100ms".to_string());
		}

		Ok(())
	}
}
