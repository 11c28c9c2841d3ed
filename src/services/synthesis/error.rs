use std::{error::Error, fmt};

use tracing::error;

/// Errors that can occur while synthesizing the configuration directory
#[derive(Debug)]
pub enum SynthesisError {
	IoError(String),
	SerializeError(String),
}

impl SynthesisError {
	fn format_message(&self) -> String {
		match self {
			Self::IoError(msg) => format!("IO error: {}", msg),
			Self::SerializeError(msg) => format!("Serialize error: {}", msg),
		}
	}

	pub fn io_error(msg: impl Into<String>) -> Self {
		let error = Self::IoError(msg.into());
		error!("{}", error.format_message());
		error
	}

	pub fn serialize_error(msg: impl Into<String>) -> Self {
		let error = Self::SerializeError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for SynthesisError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for SynthesisError {}

impl From<std::io::Error> for SynthesisError {
	fn from(err: std::io::Error) -> Self {
		Self::io_error(err.to_string())
	}
}

impl From<serde_json::Error> for SynthesisError {
	fn from(err: serde_json::Error) -> Self {
		Self::serialize_error(err.to_string())
	}
}
