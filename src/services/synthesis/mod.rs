mod error;
mod service;

pub use error::SynthesisError;
pub use service::{ConfigDestination, ConfigSynthesizer};
