use std::{path::Path, time::Duration};

use blockwatcher_runner::services::progress::ProgressTracker;
use tokio::sync::watch;

fn write_last_block(dir: &Path, network: &str, block: u64) {
	std::fs::write(
		dir.join(format!("{}_last_block.txt", network)),
		block.to_string(),
	)
	.unwrap();
}

#[tokio::test]
async fn test_statistics_span_over_marker_sequence() {
	let dir = tempfile::tempdir().unwrap();
	let tracker = ProgressTracker::new(dir.path(), false);

	// Monotonically increasing reads, then one regressive read
	for block in [1000, 1004, 1010] {
		write_last_block(dir.path(), "ethereum_mainnet", block);
		tracker.poll_once().await;
	}
	write_last_block(dir.path(), "ethereum_mainnet", 990);
	tracker.poll_once().await;

	let stats = tracker.snapshot().await;
	let progress = &stats["ethereum_mainnet"];
	assert_eq!(progress.first_block, 1000);
	assert_eq!(progress.last_block, 1010);
	assert_eq!(
		progress.blocks_processed,
		progress.last_block - progress.first_block
	);
}

#[tokio::test]
async fn test_missed_block_markers_do_not_mutate_statistics() {
	let dir = tempfile::tempdir().unwrap();
	let tracker = ProgressTracker::new(dir.path(), false);

	write_last_block(dir.path(), "ethereum_mainnet", 1000);
	std::fs::write(
		dir.path().join("ethereum_mainnet_missed_blocks.txt"),
		"998\n999\n",
	)
	.unwrap();
	tracker.poll_once().await;

	let stats = tracker.snapshot().await;
	assert_eq!(stats.len(), 1);
	assert_eq!(stats["ethereum_mainnet"].last_block, 1000);
	assert_eq!(stats["ethereum_mainnet"].blocks_processed, 0);
}

#[tokio::test]
async fn test_background_loop_observes_progress_and_stops() {
	let dir = tempfile::tempdir().unwrap();
	let tracker = ProgressTracker::new(dir.path(), false);
	let (shutdown_tx, shutdown_rx) = watch::channel(false);

	write_last_block(dir.path(), "stellar_mainnet", 500);

	let handle = {
		let tracker = tracker.clone();
		tokio::spawn(async move { tracker.run(shutdown_rx).await })
	};

	// Give the loop a couple of ticks to pick up the marker
	tokio::time::sleep(Duration::from_millis(2500)).await;
	write_last_block(dir.path(), "stellar_mainnet", 510);
	tokio::time::sleep(Duration::from_millis(2500)).await;

	shutdown_tx.send(true).unwrap();
	tokio::time::timeout(Duration::from_secs(5), handle)
		.await
		.expect("tracker did not stop on shutdown")
		.unwrap();

	let stats = tracker.snapshot().await;
	assert_eq!(stats["stellar_mainnet"].first_block, 500);
	assert_eq!(stats["stellar_mainnet"].last_block, 510);
	assert_eq!(stats["stellar_mainnet"].blocks_processed, 10);
}

#[tokio::test]
async fn test_snapshot_is_a_detached_copy() {
	let dir = tempfile::tempdir().unwrap();
	let tracker = ProgressTracker::new(dir.path(), false);

	write_last_block(dir.path(), "ethereum_mainnet", 100);
	tracker.poll_once().await;
	let before = tracker.snapshot().await;

	write_last_block(dir.path(), "ethereum_mainnet", 200);
	tracker.poll_once().await;

	assert_eq!(before["ethereum_mainnet"].last_block, 100);
	assert_eq!(tracker.snapshot().await["ethereum_mainnet"].last_block, 200);
}
