//! copytune - iterative prompt refinement for marketing copy
//!
//! Each round generates copy from a prompt template, scores the copies with a
//! simulated A/B test, and asks the model for a better template based on the
//! winner. The template produced by the last round is the result.

pub mod agents;
pub mod error;
pub mod llm;
pub mod optimizer;
pub mod prompt;

pub use error::{CopytuneError, Result};
