//! Errors raised at the configuration-file parse boundary.
//!
//! Field presence and shape are checked when a file is read, so the rest
//! of the runner only ever sees well-formed records.

use std::{error::Error, fmt};

use tracing::error;

/// Errors that can occur while reading configuration files
#[derive(Debug)]
pub enum ConfigError {
	/// The file parsed but its contents violate an invariant
	Validation(String),

	/// The file is not valid JSON for the expected record shape
	Parse(String),

	/// The file or its directory could not be read
	File(String),
}

impl ConfigError {
	fn format_message(&self) -> String {
		match self {
			Self::Validation(msg) => format!("Invalid configuration: {}", msg),
			Self::Parse(msg) => format!("Failed to parse configuration: {}", msg),
			Self::File(msg) => format!("Configuration file error: {}", msg),
		}
	}

	/// Create a new validation error and log it
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::Validation(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new parse error and log it
	pub fn parse_error(msg: impl Into<String>) -> Self {
		let error = Self::Parse(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new file error and log it
	pub fn file_error(msg: impl Into<String>) -> Self {
		let error = Self::File(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for ConfigError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
	fn from(err: std::io::Error) -> Self {
		Self::file_error(err.to_string())
	}
}

impl From<serde_json::Error> for ConfigError {
	fn from(err: serde_json::Error) -> Self {
		Self::parse_error(err.to_string())
	}
}
