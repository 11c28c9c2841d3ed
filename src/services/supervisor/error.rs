use std::{error::Error, fmt};

use tracing::error;

/// Errors that can occur while supervising the external process
#[derive(Debug)]
pub enum SupervisorError {
	/// The external binary could not be located
	BinaryNotFound(String),

	/// The external process could not be launched
	LaunchError(String),

	/// An I/O error occurred while supervising the running process
	IoError(String),
}

impl SupervisorError {
	fn format_message(&self) -> String {
		match self {
			Self::BinaryNotFound(msg) => format!("Binary not found: {}", msg),
			Self::LaunchError(msg) => format!("Launch error: {}", msg),
			Self::IoError(msg) => format!("IO error: {}", msg),
		}
	}

	pub fn binary_not_found(msg: impl Into<String>) -> Self {
		let error = Self::BinaryNotFound(msg.into());
		error!("{}", error.format_message());
		error
	}

	pub fn launch_error(msg: impl Into<String>) -> Self {
		let error = Self::LaunchError(msg.into());
		error!("{}", error.format_message());
		error
	}

	pub fn io_error(msg: impl Into<String>) -> Self {
		let error = Self::IoError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for SupervisorError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for SupervisorError {}

impl From<std::io::Error> for SupervisorError {
	fn from(err: std::io::Error) -> Self {
		Self::io_error(err.to_string())
	}
}
