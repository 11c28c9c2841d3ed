//! Bootstrap module composing one supervised run.
//!
//! Wires the configuration sources, the synthesizer, the process
//! supervisor, and the progress tracker into a single flow:
//! load → synthesize → launch → track until exit or interrupt →
//! shutdown → report.

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};

use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
	repositories::{
		DatabaseRepository, FileNetworkRepository, NetworkRepositoryTrait, TriggerStore,
	},
	services::{
		progress::{NetworkProgress, ProgressTracker},
		supervisor::{resolve_binary, LaunchEnv, ProcessSupervisor, RunState},
		synthesis::ConfigSynthesizer,
	},
};

pub type Result<T> = anyhow::Result<T>;

/// Everything one run needs, resolved from the CLI before any work starts.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
	/// Network slugs to watch; empty means every active network
	pub networks: Vec<String>,
	pub data_dir: PathBuf,
	pub config_dir: PathBuf,
	pub store_blocks: bool,
	pub verbose: bool,
	pub use_database: bool,
	pub database_url: String,
	pub tenant_id: Uuid,
}

/// Run the blockwatcher to completion and return the exit code to surface.
///
/// Startup failures (no binary, no networks, unreachable database) are
/// returned as errors; a non-zero exit of the external process is not an
/// error here, it becomes the returned code.
pub async fn run(config: RunnerConfig) -> Result<i32> {
	tokio::fs::create_dir_all(&config.data_dir).await?;

	let (networks, monitors, triggers, synthesizer) = if config.use_database {
		let repository =
			DatabaseRepository::connect(&config.database_url, config.tenant_id).await?;
		let networks = repository.load_networks(&config.networks).await?;

		// A failure here degrades to fabricated no-op monitors instead of
		// aborting the run; network loading above stays fatal.
		let (monitors, triggers) = match repository.load_monitors_and_triggers().await {
			Ok(loaded) => loaded,
			Err(e) => {
				warn!("failed to load monitors/triggers, using minimal defaults: {}", e);
				(Vec::new(), TriggerStore::new())
			}
		};

		(
			networks,
			monitors,
			triggers,
			ConfigSynthesizer::persistent(&config.config_dir),
		)
	} else {
		let repository = FileNetworkRepository::new(&config.config_dir);
		let networks = repository.load_networks(&config.networks).await?;
		(
			networks,
			Vec::new(),
			TriggerStore::new(),
			ConfigSynthesizer::ephemeral()?,
		)
	};

	info!(
		"watching {} network(s): {}",
		networks.len(),
		networks.keys().cloned().collect::<Vec<_>>().join(", ")
	);

	let config_path =
		synthesizer.synthesize(&networks, &monitors, &triggers, config.store_blocks)?;

	let binary = resolve_binary(Path::new("."))?;
	let launch_env = LaunchEnv::new(&config_path, &config.data_dir, config.verbose);

	let mut supervisor = ProcessSupervisor::new();
	supervisor.start(&binary, &launch_env, config.verbose)?;
	let relay_handles = supervisor.relay_output();

	let (shutdown_tx, shutdown_rx) = watch::channel(false);
	let tracker = ProgressTracker::new(&config.data_dir, config.verbose);
	let tracker_handle = {
		let tracker = tracker.clone();
		tokio::spawn(async move { tracker.run(shutdown_rx).await })
	};

	let final_state = tokio::select! {
		status = supervisor.wait() => {
			match status {
				Ok(status) => {
					info!("external process exited with {}", status);
					RunState::Stopped
				}
				Err(e) => {
					error!("lost track of the external process: {}", e);
					supervisor.request_stop().await.unwrap_or(RunState::Killed)
				}
			}
		}
		_ = tokio::signal::ctrl_c() => {
			info!("shutdown signal received, stopping external process...");
			// The final report still has to print, so a failed stop
			// escalation is logged rather than propagated from here.
			match supervisor.request_stop().await {
				Ok(state) => state,
				Err(e) => {
					error!("failed to stop the external process: {}", e);
					RunState::Killed
				}
			}
		}
	};

	let _ = shutdown_tx.send(true);
	if let Err(e) = tracker_handle.await {
		warn!("progress tracker task failed: {}", e);
	}
	futures::future::join_all(relay_handles).await;

	print_final_report(&tracker.snapshot().await);
	info!("shutdown complete ({:?})", final_state);

	Ok(supervisor.exit_code().unwrap_or(0))
}

/// Best-effort statistics report, printed however the run ended.
fn print_final_report(stats: &HashMap<String, NetworkProgress>) {
	if stats.is_empty() {
		info!("no block progress was recorded");
		return;
	}

	let mut networks: Vec<_> = stats.iter().collect();
	networks.sort_by(|a, b| a.0.cmp(b.0));

	info!("Final statistics:");
	for (network, progress) in networks {
		info!(
			"{}: blocks processed: {}, last block: {}, last update: {}",
			network,
			progress.blocks_processed,
			progress.last_block,
			progress.last_update.format("%H:%M:%S")
		);
	}
}
