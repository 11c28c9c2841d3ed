//! External process lifecycle management.
//!
//! Owns the child process handle for the external block-indexing binary:
//! launch with a derived environment, graceful stop with a timed escalation
//! to a forced kill, and an output relay that keeps the operator informed
//! of the child's errors and warnings without full log volume.

use std::{
	path::{Path, PathBuf},
	process::{ExitStatus, Stdio},
	time::Duration,
};

use tokio::{
	io::{AsyncBufReadExt, AsyncRead, BufReader},
	process::{Child, Command},
	task::JoinHandle,
};
use tracing::{info, warn};

use super::error::SupervisorError;

/// Name of the external binary this runner supervises.
pub const BINARY_NAME: &str = "openzeppelin-monitor";

/// How long a graceful stop may take before escalating to a forced kill.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle of the supervised process.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunState {
	Idle,
	Starting,
	Running,
	Stopping,
	/// The child exited within the stop timeout window
	Stopped,
	/// The child ignored the termination request and was forcibly killed
	Killed,
}

/// Environment handed to the child process, kept as an explicit struct so
/// it can be inspected in tests without spawning anything.
#[derive(Debug, Clone, PartialEq)]
pub struct LaunchEnv {
	pub config_dir: PathBuf,
	pub data_dir: PathBuf,
	pub log_level: String,
}

impl LaunchEnv {
	pub fn new(config_dir: &Path, data_dir: &Path, verbose: bool) -> Self {
		LaunchEnv {
			config_dir: config_dir.to_path_buf(),
			data_dir: data_dir.to_path_buf(),
			log_level: if verbose { "info" } else { "warn" }.to_string(),
		}
	}

	/// Render the environment variables the external process reads.
	pub fn to_env_vars(&self) -> Vec<(String, String)> {
		vec![
			(
				"CONFIG_DIR".to_string(),
				self.config_dir.display().to_string(),
			),
			(
				"LOG_DATA_DIR".to_string(),
				self.data_dir.display().to_string(),
			),
			("RUST_LOG".to_string(), self.log_level.clone()),
		]
	}
}

/// Locate the external binary, preferring a release build, then a debug
/// build, then the working directory itself.
pub fn resolve_binary(root: &Path) -> Result<PathBuf, SupervisorError> {
	let candidates = [
		root.join("target/release").join(BINARY_NAME),
		root.join("target/debug").join(BINARY_NAME),
		root.join(BINARY_NAME),
	];

	candidates
		.into_iter()
		.find(|path| path.exists())
		.ok_or_else(|| {
			SupervisorError::binary_not_found(format!(
				"{} not found under {}; build the external project first",
				BINARY_NAME,
				root.display()
			))
		})
}

pub struct ProcessSupervisor {
	child: Option<Child>,
	state: RunState,
	stop_timeout: Duration,
	exit_status: Option<ExitStatus>,
}

impl Default for ProcessSupervisor {
	fn default() -> Self {
		Self::new()
	}
}

impl ProcessSupervisor {
	pub fn new() -> Self {
		ProcessSupervisor {
			child: None,
			state: RunState::Idle,
			stop_timeout: STOP_TIMEOUT,
			exit_status: None,
		}
	}

	/// Replace the stop-escalation timeout (10 seconds by default).
	pub fn with_stop_timeout(mut self, timeout: Duration) -> Self {
		self.stop_timeout = timeout;
		self
	}

	pub fn state(&self) -> RunState {
		self.state
	}

	/// The child's exit code, once it has terminated. `None` while running
	/// or when the child was ended by a signal.
	pub fn exit_code(&self) -> Option<i32> {
		self.exit_status.and_then(|status| status.code())
	}

	/// Launch the external process with the derived environment.
	///
	/// In verbose mode the child inherits the runner's stdio; otherwise its
	/// output is piped so [`relay_output`](Self::relay_output) can filter it.
	pub fn start(
		&mut self,
		binary: &Path,
		env: &LaunchEnv,
		verbose: bool,
	) -> Result<(), SupervisorError> {
		if self.state != RunState::Idle {
			return Err(SupervisorError::launch_error(format!(
				"cannot start from state {:?}",
				self.state
			)));
		}
		self.state = RunState::Starting;

		let mut command = Command::new(binary);
		command.envs(env.to_env_vars()).kill_on_drop(true);
		if verbose {
			command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
		} else {
			command.stdout(Stdio::piped()).stderr(Stdio::piped());
		}

		let child = command.spawn().map_err(|e| {
			self.state = RunState::Idle;
			SupervisorError::launch_error(format!("failed to spawn {}: {}", binary.display(), e))
		})?;

		info!("started {} (pid {:?})", binary.display(), child.id());
		self.child = Some(child);
		self.state = RunState::Running;
		Ok(())
	}

	/// Drain the child's piped output, re-emitting only lines carrying
	/// error or warning markers.
	///
	/// Both pipes are drained even though only marked lines are re-emitted;
	/// an undrained pipe would eventually block the child.
	pub fn relay_output(&mut self) -> Vec<JoinHandle<()>> {
		let mut handles = Vec::new();
		if let Some(child) = self.child.as_mut() {
			if let Some(stdout) = child.stdout.take() {
				handles.push(tokio::spawn(relay_stream(stdout)));
			}
			if let Some(stderr) = child.stderr.take() {
				handles.push(tokio::spawn(relay_stream(stderr)));
			}
		}
		handles
	}

	/// Wait for the child to exit on its own.
	pub async fn wait(&mut self) -> Result<ExitStatus, SupervisorError> {
		let child = self
			.child
			.as_mut()
			.ok_or_else(|| SupervisorError::io_error("process not started"))?;
		let status = child
			.wait()
			.await
			.map_err(|e| SupervisorError::io_error(format!("wait failed: {}", e)))?;
		self.exit_status = Some(status);
		self.state = RunState::Stopped;
		Ok(status)
	}

	/// Request a graceful stop, escalating to a forced kill when the child
	/// does not exit within the stop timeout.
	///
	/// Returns the terminal state: [`RunState::Stopped`] for a clean exit,
	/// [`RunState::Killed`] when the timeout expired.
	pub async fn request_stop(&mut self) -> Result<RunState, SupervisorError> {
		let Some(child) = self.child.as_mut() else {
			return Err(SupervisorError::io_error("process not started"));
		};
		self.state = RunState::Stopping;
		signal_terminate(child);

		match tokio::time::timeout(self.stop_timeout, child.wait()).await {
			Ok(Ok(status)) => {
				self.exit_status = Some(status);
				self.state = RunState::Stopped;
				info!("process terminated gracefully");
			}
			Ok(Err(e)) => {
				return Err(SupervisorError::io_error(format!("wait failed: {}", e)));
			}
			Err(_) => {
				child
					.start_kill()
					.map_err(|e| SupervisorError::io_error(format!("kill failed: {}", e)))?;
				let status = child
					.wait()
					.await
					.map_err(|e| SupervisorError::io_error(format!("wait failed: {}", e)))?;
				self.exit_status = Some(status);
				self.state = RunState::Killed;
				warn!("process did not stop within {:?}, killed forcefully", self.stop_timeout);
			}
		}

		Ok(self.state)
	}
}

#[cfg(unix)]
fn signal_terminate(child: &mut Child) {
	if let Some(pid) = child.id() {
		// SAFETY: plain kill(2) on a pid this supervisor owns
		unsafe {
			libc::kill(pid as libc::pid_t, libc::SIGTERM);
		}
	}
}

#[cfg(not(unix))]
fn signal_terminate(child: &mut Child) {
	let _ = child.start_kill();
}

async fn relay_stream<R>(reader: R)
where
	R: AsyncRead + Unpin + Send + 'static,
{
	let mut lines = BufReader::new(reader).lines();
	while let Ok(Some(line)) = lines.next_line().await {
		if line.contains("ERROR") {
			tracing::error!("{}", line.trim_end());
		} else if line.contains("WARN") {
			tracing::warn!("{}", line.trim_end());
		}
	}
}
