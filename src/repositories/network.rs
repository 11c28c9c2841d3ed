//! Network configuration sources.
//!
//! Defines the common loading contract for network records and the
//! flat-file backend, which reads one JSON file per network from
//! `<config_dir>/networks/`.

use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
};

use async_trait::async_trait;

use crate::{
	models::{ConfigLoader, Network},
	repositories::error::RepositoryError,
};

/// Interface for loading network records from a backend.
///
/// An empty selection loads every active record; a non-empty selection
/// narrows the result to the requested slugs. The result is ordered by slug.
#[async_trait]
pub trait NetworkRepositoryTrait {
	async fn load_networks(
		&self,
		selection: &[String],
	) -> Result<BTreeMap<String, Network>, RepositoryError>;
}

/// Flat-file network source reading `<config_dir>/networks/*.json`.
pub struct FileNetworkRepository {
	config_dir: PathBuf,
}

impl FileNetworkRepository {
	pub fn new(config_dir: &Path) -> Self {
		FileNetworkRepository {
			config_dir: config_dir.to_path_buf(),
		}
	}
}

#[async_trait]
impl NetworkRepositoryTrait for FileNetworkRepository {
	async fn load_networks(
		&self,
		selection: &[String],
	) -> Result<BTreeMap<String, Network>, RepositoryError> {
		let network_dir = self.config_dir.join("networks");
		let networks: BTreeMap<String, Network> = Network::load_all(&network_dir)
			.map_err(|e| RepositoryError::load_error(format!("failed to load networks: {}", e)))?;

		filter_selection(networks, selection)
	}
}

/// Apply a slug selection to a loaded network map, with the shared
/// not-found semantics of both backends.
pub(crate) fn filter_selection(
	networks: BTreeMap<String, Network>,
	selection: &[String],
) -> Result<BTreeMap<String, Network>, RepositoryError> {
	if selection.is_empty() {
		if networks.is_empty() {
			return Err(RepositoryError::not_found(
				"no network configurations found",
			));
		}
		return Ok(networks);
	}

	let selected: BTreeMap<String, Network> = networks
		.into_iter()
		.filter(|(slug, _)| selection.contains(slug))
		.collect();

	if selected.is_empty() {
		return Err(RepositoryError::not_found(format!(
			"no matching networks found for: {}",
			selection.join(", ")
		)));
	}

	Ok(selected)
}
