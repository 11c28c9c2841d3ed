mod tracker;

pub use tracker::{NetworkProgress, ProgressTracker};
