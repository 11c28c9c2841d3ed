//! Error types for configuration source operations.
//!
//! This module defines the error types that can occur while loading
//! network, monitor, and trigger records from either backend. It provides
//! a consistent error handling interface across all repository implementations.

use std::{error::Error, fmt};

use tracing::error;

/// Errors that can occur during repository operations
#[derive(Debug)]
pub enum RepositoryError {
	/// No records matched the request (empty backend or disjoint selection)
	NotFound(String),

	/// Error that occurs when loading records from a backend
	LoadError(String),

	/// Error that occurs when connecting to or querying the relational store
	ConnectionError(String),

	/// Error that occurs when a loaded record fails validation
	ValidationError(String),
}

impl RepositoryError {
	/// Format an error message for display
	fn format_message(&self) -> String {
		match self {
			Self::NotFound(msg) => format!("Not found: {}", msg),
			Self::LoadError(msg) => format!("Load error: {}", msg),
			Self::ConnectionError(msg) => format!("Connection error: {}", msg),
			Self::ValidationError(msg) => format!("Validation error: {}", msg),
		}
	}

	/// Create a new not-found error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn not_found(msg: impl Into<String>) -> Self {
		let error = Self::NotFound(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new load error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn load_error(msg: impl Into<String>) -> Self {
		let error = Self::LoadError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new connection error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn connection_error(msg: impl Into<String>) -> Self {
		let error = Self::ConnectionError(msg.into());
		error!("{}", error.format_message());
		error
	}

	/// Create a new validation error with the given message
	///
	/// Also logs the error message at the error level.
	pub fn validation_error(msg: impl Into<String>) -> Self {
		let error = Self::ValidationError(msg.into());
		error!("{}", error.format_message());
		error
	}
}

impl fmt::Display for RepositoryError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.format_message())
	}
}

impl Error for RepositoryError {}

impl From<std::io::Error> for RepositoryError {
	fn from(err: std::io::Error) -> Self {
		Self::load_error(err.to_string())
	}
}

impl From<sqlx::Error> for RepositoryError {
	fn from(err: sqlx::Error) -> Self {
		Self::connection_error(err.to_string())
	}
}
