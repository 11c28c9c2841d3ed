//! Process supervision tests against real child processes.
//!
//! Unix-only: the stop path is exercised with shell scripts that either
//! honor or ignore SIGTERM.

#![cfg(unix)]

use std::{path::Path, path::PathBuf, time::Duration};

use blockwatcher_runner::services::supervisor::{LaunchEnv, ProcessSupervisor, RunState};

fn write_script(dir: &Path, name: &str, content: &str) -> PathBuf {
	use std::os::unix::fs::PermissionsExt;

	let path = dir.join(name);
	std::fs::write(&path, content).unwrap();
	let mut permissions = std::fs::metadata(&path).unwrap().permissions();
	permissions.set_mode(0o755);
	std::fs::set_permissions(&path, permissions).unwrap();
	path
}

fn launch_env(dir: &Path) -> LaunchEnv {
	LaunchEnv::new(&dir.join("config"), &dir.join("data"), false)
}

#[tokio::test]
async fn test_graceful_stop_yields_stopped() {
	let dir = tempfile::tempdir().unwrap();
	let script = write_script(dir.path(), "well_behaved.sh", "#!/bin/sh\nsleep 30\n");

	let mut supervisor = ProcessSupervisor::new();
	supervisor.start(&script, &launch_env(dir.path()), false).unwrap();
	assert_eq!(supervisor.state(), RunState::Running);

	let state = supervisor.request_stop().await.unwrap();
	assert_eq!(state, RunState::Stopped);
	// Ended by the termination signal, so there is no exit code
	assert_eq!(supervisor.exit_code(), None);
}

#[tokio::test]
async fn test_stop_ignoring_child_is_killed_after_timeout() {
	let dir = tempfile::tempdir().unwrap();
	let script = write_script(
		dir.path(),
		"stubborn.sh",
		"#!/bin/sh\ntrap '' TERM\nwhile true; do sleep 1; done\n",
	);

	let mut supervisor =
		ProcessSupervisor::new().with_stop_timeout(Duration::from_millis(500));
	supervisor.start(&script, &launch_env(dir.path()), false).unwrap();
	// Let the child install its `trap '' TERM` before we signal it; otherwise
	// the stop request can race the shell's startup and hit the default
	// disposition, terminating it before it ever becomes stubborn.
	tokio::time::sleep(Duration::from_millis(200)).await;

	let state = supervisor.request_stop().await.unwrap();
	assert_eq!(state, RunState::Killed);
}

#[tokio::test]
async fn test_nonzero_exit_code_is_surfaced() {
	let dir = tempfile::tempdir().unwrap();
	let script = write_script(dir.path(), "failing.sh", "#!/bin/sh\nexit 7\n");

	let mut supervisor = ProcessSupervisor::new();
	supervisor.start(&script, &launch_env(dir.path()), false).unwrap();

	let status = supervisor.wait().await.unwrap();
	assert_eq!(status.code(), Some(7));
	assert_eq!(supervisor.exit_code(), Some(7));
	assert_eq!(supervisor.state(), RunState::Stopped);
}

#[tokio::test]
async fn test_stop_after_child_already_exited_is_stopped() {
	let dir = tempfile::tempdir().unwrap();
	let script = write_script(dir.path(), "instant.sh", "#!/bin/sh\nexit 0\n");

	let mut supervisor = ProcessSupervisor::new();
	supervisor.start(&script, &launch_env(dir.path()), false).unwrap();
	tokio::time::sleep(Duration::from_millis(200)).await;

	let state = supervisor.request_stop().await.unwrap();
	assert_eq!(state, RunState::Stopped);
	assert_eq!(supervisor.exit_code(), Some(0));
}

#[tokio::test]
async fn test_child_environment_receives_derived_variables() {
	let dir = tempfile::tempdir().unwrap();
	let marker = dir.path().join("env_dump.txt");
	let script = write_script(
		dir.path(),
		"env_dump.sh",
		&format!(
			"#!/bin/sh\necho \"$CONFIG_DIR:$LOG_DATA_DIR:$RUST_LOG\" > {}\n",
			marker.display()
		),
	);

	let env = LaunchEnv::new(Path::new("/tmp/cfg"), Path::new("/tmp/data"), false);
	let mut supervisor = ProcessSupervisor::new();
	supervisor.start(&script, &env, false).unwrap();
	supervisor.wait().await.unwrap();

	let dumped = std::fs::read_to_string(&marker).unwrap();
	assert_eq!(dumped.trim(), "/tmp/cfg:/tmp/data:warn");
}

#[tokio::test]
async fn test_relay_tasks_drain_piped_output() {
	let dir = tempfile::tempdir().unwrap();
	let script = write_script(
		dir.path(),
		"chatty.sh",
		"#!/bin/sh\ni=0\nwhile [ $i -lt 200 ]; do echo \"WARN line $i\"; echo \"noise $i\" >&2; i=$((i+1)); done\n",
	);

	let mut supervisor = ProcessSupervisor::new();
	supervisor.start(&script, &launch_env(dir.path()), false).unwrap();
	let relay_handles = supervisor.relay_output();

	let status = tokio::time::timeout(Duration::from_secs(10), supervisor.wait())
		.await
		.expect("child blocked on an undrained pipe")
		.unwrap();
	assert!(status.success());

	for handle in relay_handles {
		handle.await.unwrap();
	}
}
