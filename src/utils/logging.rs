//! Logging setup for the runner.
//!
//! The runner's own output is operator-facing status lines, so the format
//! stays compact and targets are hidden. `RUST_LOG` always wins when set;
//! otherwise the `--verbose` flag picks the default level.
//!
//! `setup_logging` writes to stdout; `setup_logging_with_writer` accepts a
//! custom writer, which the tests use to capture output.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Setup logging for the runner.
///
/// Filters via `RUST_LOG` when set; otherwise defaults to `debug` in
/// verbose mode and `info` otherwise.
pub fn setup_logging(
	verbose: bool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
	setup_logging_with_writer(verbose, std::io::stdout)?;
	Ok(())
}

/// Setup logging with a custom writer
pub fn setup_logging_with_writer<W>(
	verbose: bool,
	writer: W,
) -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>
where
	W: for<'writer> tracing_subscriber::fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
	let default_level = if verbose { "debug" } else { "info" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

	tracing_subscriber::registry()
		.with(filter)
		.with(
			fmt::layer()
				.with_writer(writer)
				.with_target(false)
				.with_thread_ids(false)
				.with_thread_names(false)
				.compact(),
		)
		.try_init()?;
	Ok(())
}
