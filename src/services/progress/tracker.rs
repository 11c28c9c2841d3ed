//! Block progress tracking from the external process's data files.
//!
//! The external process reports progress only through the filesystem: one
//! `<slug>_last_block.txt` per network holding the latest processed block
//! height, and one `<slug>_missed_blocks.txt` listing skipped heights. The
//! tracker polls both at a fixed cadence and maintains per-network
//! statistics. The child and the runner stay fully decoupled; a child
//! crash or restart loses no historical state.

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	sync::Arc,
	time::Duration,
};

use chrono::{DateTime, Utc};
use glob::glob;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_secs(1);

const LAST_BLOCK_SUFFIX: &str = "_last_block";
const MISSED_BLOCKS_SUFFIX: &str = "_missed_blocks";

/// Running statistics for one network, created on the first observed
/// progress marker and only ever advanced from there.
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkProgress {
	pub first_block: u64,
	pub last_block: u64,
	pub blocks_processed: u64,
	pub last_update: DateTime<Utc>,
}

/// Polls a data directory for per-network progress markers.
///
/// The statistics map is owned by the tracker; the orchestrator only ever
/// sees clones taken through [`snapshot`](Self::snapshot), so the shutdown
/// report cannot race a mid-poll update.
#[derive(Clone)]
pub struct ProgressTracker {
	data_dir: PathBuf,
	stats: Arc<Mutex<HashMap<String, NetworkProgress>>>,
	verbose: bool,
}

impl ProgressTracker {
	pub fn new(data_dir: &Path, verbose: bool) -> Self {
		ProgressTracker {
			data_dir: data_dir.to_path_buf(),
			stats: Arc::new(Mutex::new(HashMap::new())),
			verbose,
		}
	}

	/// Poll until the shutdown flag flips.
	///
	/// Cancellation is cooperative: the loop finishes its current iteration
	/// and exits on the next select.
	pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
		let mut interval = tokio::time::interval(POLL_INTERVAL);
		interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

		loop {
			tokio::select! {
				_ = interval.tick() => {
					self.poll_once().await;
				}
				result = shutdown.changed() => {
					if result.is_err() || *shutdown.borrow() {
						break;
					}
				}
			}
		}
		debug!("progress tracker stopped");
	}

	/// One polling pass over the data directory.
	///
	/// Updates statistics from progress markers and warns about missed
	/// blocks. Failures on individual files are skipped; they never stop
	/// the pass.
	pub async fn poll_once(&self) {
		self.scan_progress_markers().await;
		self.scan_missed_block_markers().await;
	}

	/// Clone of the current statistics, keyed by network slug.
	pub async fn snapshot(&self) -> HashMap<String, NetworkProgress> {
		self.stats.lock().await.clone()
	}

	async fn scan_progress_markers(&self) {
		let pattern = self
			.data_dir
			.join(format!("*{}.txt", LAST_BLOCK_SUFFIX))
			.to_string_lossy()
			.to_string();

		let entries = match glob(&pattern) {
			Ok(entries) => entries,
			Err(e) => {
				warn!("invalid progress marker pattern: {}", e);
				return;
			}
		};

		for path in entries.flatten() {
			let Some(network) = marker_network(&path, LAST_BLOCK_SUFFIX) else {
				continue;
			};

			let block_number = match read_block_number(&path).await {
				Ok(block_number) => block_number,
				Err(e) => {
					if self.verbose {
						warn!("error reading {}: {}", path.display(), e);
					}
					continue;
				}
			};

			self.record(&network, block_number).await;
		}
	}

	/// Apply one marker observation. Only a strictly higher block number
	/// advances the statistics; stale or out-of-order reads are ignored.
	async fn record(&self, network: &str, block_number: u64) {
		let mut stats = self.stats.lock().await;
		match stats.get_mut(network) {
			None => {
				stats.insert(network.to_string(), NetworkProgress {
					first_block: block_number,
					last_block: block_number,
					blocks_processed: 0,
					last_update: Utc::now(),
				});
			}
			Some(progress) => {
				if block_number > progress.last_block {
					let delta = block_number - progress.last_block;
					progress.last_block = block_number;
					progress.blocks_processed = block_number - progress.first_block;
					progress.last_update = Utc::now();
					info!(
						"{}: block #{} (+{}) total: {}",
						network, block_number, delta, progress.blocks_processed
					);
				}
			}
		}
	}

	async fn scan_missed_block_markers(&self) {
		let pattern = self
			.data_dir
			.join(format!("*{}.txt", MISSED_BLOCKS_SUFFIX))
			.to_string_lossy()
			.to_string();

		let Ok(entries) = glob(&pattern) else {
			return;
		};

		for path in entries.flatten() {
			let Some(network) = marker_network(&path, MISSED_BLOCKS_SUFFIX) else {
				continue;
			};

			match tokio::fs::read_to_string(&path).await {
				Ok(content) => {
					let missed = content.lines().filter(|l| !l.trim().is_empty()).count();
					if missed > 0 {
						warn!("{} has {} missed blocks!", network, missed);
					}
				}
				Err(e) => {
					if self.verbose {
						warn!("error reading {}: {}", path.display(), e);
					}
				}
			}
		}
	}
}

/// Extract the network slug from a marker file name, e.g.
/// `ethereum_mainnet_last_block.txt` → `ethereum_mainnet`.
fn marker_network(path: &Path, suffix: &str) -> Option<String> {
	path.file_stem()
		.and_then(|stem| stem.to_str())
		.and_then(|stem| stem.strip_suffix(suffix))
		.map(|network| network.to_string())
}

async fn read_block_number(path: &Path) -> Result<u64, String> {
	let content = tokio::fs::read_to_string(path)
		.await
		.map_err(|e| e.to_string())?;
	content.trim().parse::<u64>().map_err(|e| e.to_string())
}
