//! The three agents of an optimization round: write copies, score them,
//! refine the template.

use std::collections::HashMap;

mod copywriter;
mod evaluator;
mod refiner;

pub use copywriter::{CopyWriter, parse_candidates};
pub use evaluator::{Evaluator, RandomEvaluator};
pub use refiner::{Refinement, Refiner, best_candidate};

/// One generated piece of marketing copy
pub type Candidate = String;

/// Score per unique candidate, higher is better
pub type ScoreMap = HashMap<Candidate, f64>;
