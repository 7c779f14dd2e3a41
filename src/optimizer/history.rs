//! Per-round record of an optimization run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::{Candidate, ScoreMap};
use crate::prompt::Template;

/// What happened in one generate → score → refine round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round number
    pub round: u32,

    /// Template the round started from
    pub template: Template,

    /// Copies generated from `template`, in the order received
    pub candidates: Vec<Candidate>,

    pub scores: ScoreMap,

    pub best_copy: Candidate,
    pub best_score: f64,

    /// Template proposed by the refiner
    pub refined: Template,

    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,
}

/// Outcome of a full optimization run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRun {
    pub product: String,
    pub initial_template: Template,
    pub final_template: Template,
    pub rounds: Vec<RoundRecord>,
}

impl OptimizationRun {
    pub fn new(product: impl Into<String>, initial_template: Template) -> Self {
        Self {
            product: product.into(),
            final_template: initial_template.clone(),
            initial_template,
            rounds: Vec::new(),
        }
    }

    /// Append a finished round; its refined template becomes the final one.
    pub fn push(&mut self, record: RoundRecord) {
        self.final_template = record.refined.clone();
        self.rounds.push(record);
    }

    /// Best copy over all rounds with its score
    pub fn best_overall(&self) -> Option<(&str, f64)> {
        self.rounds
            .iter()
            .max_by(|a, b| a.best_score.total_cmp(&b.best_score))
            .map(|r| (r.best_copy.as_str(), r.best_score))
    }

    pub fn total_candidates(&self) -> usize {
        self.rounds.iter().map(|r| r.candidates.len()).sum()
    }
}
