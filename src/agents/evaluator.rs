//! Candidate scoring.
//!
//! `RandomEvaluator` simulates an A/B test by drawing a conversion-rate proxy
//! for each candidate. A real measurement system plugs in by implementing
//! `Evaluator`.

use std::sync::Mutex;

use async_trait::async_trait;
use log::debug;

use super::{Candidate, ScoreMap};
use crate::error::Result;

/// Assigns each candidate a score; higher is better.
#[async_trait]
pub trait Evaluator: Send + Sync {
    /// Score every candidate. Duplicate candidates share a single entry.
    async fn score(&self, candidates: &[Candidate]) -> Result<ScoreMap>;
}

/// Scores drawn uniformly from `[0, 1)`.
pub struct RandomEvaluator {
    rng: Mutex<fastrand::Rng>,
}

impl RandomEvaluator {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Reproducible scores for a given seed.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }
}

impl Default for RandomEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Evaluator for RandomEvaluator {
    async fn score(&self, candidates: &[Candidate]) -> Result<ScoreMap> {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let scores: ScoreMap = candidates.iter().map(|c| (c.clone(), rng.f64())).collect();
        debug!("Scored {} candidates ({} unique)", candidates.len(), scores.len());
        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn candidates(items: &[&str]) -> Vec<Candidate> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_empty_candidates_empty_map() {
        let scores = RandomEvaluator::new().score(&[]).await.unwrap();
        assert!(scores.is_empty());
    }

    #[tokio::test]
    async fn test_scores_in_unit_interval() {
        let evaluator = RandomEvaluator::with_seed(7);
        let input: Vec<Candidate> = (0..500).map(|i| format!("copy {}", i)).collect();

        let scores = evaluator.score(&input).await.unwrap();

        assert_eq!(scores.len(), 500);
        assert!(scores.values().all(|s| (0.0..1.0).contains(s)));
    }

    #[tokio::test]
    async fn test_key_set_is_unique_candidates() {
        let input = candidates(&["Copy A", "Copy B", "Copy A"]);
        let scores = RandomEvaluator::new().score(&input).await.unwrap();

        let keys: HashSet<&str> = scores.keys().map(String::as_str).collect();
        assert_eq!(keys, HashSet::from(["Copy A", "Copy B"]));
    }

    #[tokio::test]
    async fn test_seeded_runs_repeat() {
        let input = candidates(&["a", "b", "c"]);
        let first = RandomEvaluator::with_seed(42).score(&input).await.unwrap();
        let second = RandomEvaluator::with_seed(42).score(&input).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_successive_calls_draw_fresh_scores() {
        let evaluator = RandomEvaluator::with_seed(1);
        let input = candidates(&["a", "b", "c", "d"]);

        let first = evaluator.score(&input).await.unwrap();
        let second = evaluator.score(&input).await.unwrap();

        assert_ne!(first, second);
    }
}
