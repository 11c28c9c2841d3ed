mod error;
mod service;

pub use error::SupervisorError;
pub use service::{
	resolve_binary, LaunchEnv, ProcessSupervisor, RunState, BINARY_NAME, STOP_TIMEOUT,
};
