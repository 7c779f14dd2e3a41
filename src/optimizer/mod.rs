//! Optimization loop and its round history.

mod history;
mod runner;

pub use history::{OptimizationRun, RoundRecord};
pub use runner::{DEFAULT_COPIES_PER_ROUND, Optimizer, OptimizerConfig};
