//! Optimizer - drives generate → score → refine rounds over a template.
//!
//! Each round finishes completely before the next starts. The first error
//! aborts the run; no partial result is returned.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use log::{info, warn};

use super::history::{OptimizationRun, RoundRecord};
use crate::agents::{CopyWriter, Evaluator, Refiner};
use crate::error::Result;
use crate::llm::TextGenerator;
use crate::prompt::{COUNT_SLOT, PRODUCT_SLOT, Template};

/// Copies requested per round when not configured
pub const DEFAULT_COPIES_PER_ROUND: usize = 2;

/// Configuration for the Optimizer.
#[derive(Debug, Clone)]
pub struct OptimizerConfig {
    /// Copies requested from the writer each round
    pub copies_per_round: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            copies_per_round: DEFAULT_COPIES_PER_ROUND,
        }
    }
}

/// Threads a template through a fixed number of refinement rounds.
pub struct Optimizer<C, E>
where
    C: TextGenerator,
    E: Evaluator,
{
    writer: CopyWriter<C>,
    evaluator: Arc<E>,
    refiner: Refiner<C>,
    config: OptimizerConfig,
}

impl<C, E> Optimizer<C, E>
where
    C: TextGenerator,
    E: Evaluator,
{
    /// Create a new Optimizer with the given agents.
    pub fn new(writer: CopyWriter<C>, evaluator: Arc<E>, refiner: Refiner<C>) -> Self {
        Self::with_config(writer, evaluator, refiner, OptimizerConfig::default())
    }

    /// Create a new Optimizer with custom configuration.
    pub fn with_config(
        writer: CopyWriter<C>,
        evaluator: Arc<E>,
        refiner: Refiner<C>,
        config: OptimizerConfig,
    ) -> Self {
        Self {
            writer,
            evaluator,
            refiner,
            config,
        }
    }

    /// Run `rounds` rounds and return the final template.
    ///
    /// Zero rounds returns `initial` untouched without calling the service.
    pub async fn optimize(&self, product: &str, initial: Template, rounds: u32) -> Result<Template> {
        Ok(self.run(product, initial, rounds).await?.final_template)
    }

    /// Run `rounds` rounds, keeping a record of each.
    pub async fn run(&self, product: &str, initial: Template, rounds: u32) -> Result<OptimizationRun> {
        let mut run = OptimizationRun::new(product, initial);

        for round in 1..=rounds {
            let record = self.round(product, &run.final_template, round).await?;
            run.push(record);
        }

        info!("Optimization of {} finished after {} rounds", product, rounds);
        Ok(run)
    }

    async fn round(&self, product: &str, template: &Template, round: u32) -> Result<RoundRecord> {
        info!("Round {} starting", round);
        let started_at = Utc::now();
        let timer = Instant::now();

        let candidates = self
            .writer
            .generate(product, template, self.config.copies_per_round)
            .await?;
        let scores = self.evaluator.score(&candidates).await?;
        let refinement = self.refiner.refine(template, &scores).await?;

        for slot in [PRODUCT_SLOT, COUNT_SLOT] {
            if !refinement.template.has_slot(slot) {
                warn!("Round {} produced a template without the {{{}}} slot", round, slot);
            }
        }

        let elapsed_ms = u64::try_from(timer.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!("Round {} finished in {}ms", round, elapsed_ms);

        Ok(RoundRecord {
            round,
            template: template.clone(),
            candidates,
            scores,
            best_copy: refinement.best_copy,
            best_score: refinement.best_score,
            refined: refinement.template,
            started_at,
            elapsed_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::{Candidate, RandomEvaluator, ScoreMap};
    use crate::error::CopytuneError;
    use crate::llm::MockTextGenerator;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Evaluator that gives later candidates higher scores and records its inputs.
    struct RankingEvaluator {
        seen: Mutex<Vec<Vec<Candidate>>>,
    }

    impl RankingEvaluator {
        fn new() -> Self {
            Self {
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Evaluator for RankingEvaluator {
        async fn score(&self, candidates: &[Candidate]) -> Result<ScoreMap> {
            self.seen.lock().unwrap().push(candidates.to_vec());
            Ok(candidates
                .iter()
                .enumerate()
                .map(|(i, c)| (c.clone(), i as f64 / 10.0))
                .collect())
        }
    }

    /// Evaluator that gives every candidate the same score.
    struct TiedEvaluator;

    #[async_trait]
    impl Evaluator for TiedEvaluator {
        async fn score(&self, candidates: &[Candidate]) -> Result<ScoreMap> {
            Ok(candidates.iter().map(|c| (c.clone(), 0.5)).collect())
        }
    }

    struct FailingEvaluator;

    #[async_trait]
    impl Evaluator for FailingEvaluator {
        async fn score(&self, _candidates: &[Candidate]) -> Result<ScoreMap> {
            Err(CopytuneError::Service("scoring backend down".to_string()))
        }
    }

    fn optimizer<E: Evaluator>(client: Arc<MockTextGenerator>, evaluator: E) -> Optimizer<MockTextGenerator, E> {
        Optimizer::new(
            CopyWriter::new(client.clone()),
            Arc::new(evaluator),
            Refiner::new(client).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_zero_rounds_returns_initial() {
        let client = Arc::new(MockTextGenerator::new(Vec::<String>::new()));
        let opt = optimizer(client.clone(), RandomEvaluator::new());

        let result = opt.optimize("mugs", Template::new("keep {product} {n}"), 0).await.unwrap();

        assert_eq!(result.as_str(), "keep {product} {n}");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_template_threads_between_rounds() {
        let client = Arc::new(MockTextGenerator::new(vec![
            "- r1 a\n- r1 b",
            "Second {product} {n}",
            "- r2 a\n- r2 b",
            "Third {product} {n}",
        ]));
        let opt = optimizer(client.clone(), RankingEvaluator::new());

        let run = opt.run("mugs", Template::new("First {product} {n}"), 2).await.unwrap();

        assert_eq!(run.final_template.as_str(), "Third {product} {n}");
        assert_eq!(run.rounds.len(), 2);
        assert_eq!(run.rounds[0].template.as_str(), "First {product} {n}");
        assert_eq!(run.rounds[1].template.as_str(), "Second {product} {n}");
        assert_eq!(run.rounds[0].best_copy, "r1 b");
        assert_eq!(run.rounds[1].best_copy, "r2 b");

        let inputs: Vec<String> = client.requests().into_iter().map(|r| r.input).collect();
        assert_eq!(inputs[0], "First mugs 2");
        assert!(inputs[1].contains("r1 b"));
        assert_eq!(inputs[2], "Second mugs 2");
        assert!(inputs[3].contains("Second {product} {n}"));
    }

    #[tokio::test]
    async fn test_recorded_best_copy_is_the_one_sent_for_feedback() {
        let client = Arc::new(MockTextGenerator::new(vec![
            "- tie one\n- tie two\n- tie three",
            "Next {product} {n}",
        ]));
        let opt = Optimizer::with_config(
            CopyWriter::new(client.clone()),
            Arc::new(TiedEvaluator),
            Refiner::new(client.clone()).unwrap(),
            OptimizerConfig { copies_per_round: 3 },
        );

        let run = opt.run("mugs", Template::default(), 1).await.unwrap();

        let record = &run.rounds[0];
        assert_eq!(record.best_score, 0.5);
        let feedback = &client.requests()[1].input;
        assert!(feedback.contains(&format!("\n{}\n", record.best_copy)));
        let sent: Vec<&String> = record
            .candidates
            .iter()
            .filter(|c| feedback.contains(&format!("\n{}\n", c)))
            .collect();
        assert_eq!(sent.len(), 1);
    }

    #[tokio::test]
    async fn test_elapsed_and_timestamp_recorded() {
        let client = Arc::new(MockTextGenerator::new(vec!["- a", "Next {product} {n}"]));
        let opt = optimizer(client, RandomEvaluator::new());
        let before = Utc::now();

        let run = opt.run("mugs", Template::default(), 1).await.unwrap();

        let record = &run.rounds[0];
        assert!(record.started_at >= before);
        assert!(record.elapsed_ms < 60_000);
    }

    #[tokio::test]
    async fn test_evaluator_sees_exactly_generated_candidates() {
        let client = Arc::new(MockTextGenerator::new(vec!["- x\n- y\n- z", "Next {product} {n}"]));
        let evaluator = Arc::new(RankingEvaluator::new());
        let opt = Optimizer::with_config(
            CopyWriter::new(client.clone()),
            evaluator.clone(),
            Refiner::new(client.clone()).unwrap(),
            OptimizerConfig { copies_per_round: 3 },
        );

        let run = opt.run("mugs", Template::default(), 1).await.unwrap();

        let seen = evaluator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0], run.rounds[0].candidates);
        assert_eq!(seen[0], vec!["x", "y", "z"]);
    }

    #[tokio::test]
    async fn test_format_error_aborts_before_any_call() {
        let client = Arc::new(MockTextGenerator::new(vec!["unused"]));
        let opt = optimizer(client.clone(), RandomEvaluator::new());

        let result = opt.optimize("mugs", Template::new("no slots"), 3).await;

        assert!(matches!(result, Err(CopytuneError::Format(_))));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_refined_template_without_slots_fails_next_round() {
        let client = Arc::new(MockTextGenerator::new(vec!["- a", "Plain template", "unused"]));
        let opt = optimizer(client.clone(), RandomEvaluator::new());

        let result = opt.optimize("mugs", Template::default(), 2).await;

        assert!(matches!(result, Err(CopytuneError::Format(_))));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_evaluator_error_aborts_round() {
        let client = Arc::new(MockTextGenerator::new(vec!["- a\n- b", "unused"]));
        let opt = optimizer(client.clone(), FailingEvaluator);

        let result = opt.optimize("mugs", Template::default(), 2).await;

        assert!(matches!(result, Err(CopytuneError::Service(_))));
        assert_eq!(client.call_count(), 1);
    }

    #[tokio::test]
    async fn test_service_error_aborts_remaining_rounds() {
        // Generation, refinement, then the queue runs dry on round 2's generation
        let client = Arc::new(MockTextGenerator::new(vec!["- a", "Next {product} {n}"]));
        let opt = optimizer(client.clone(), RandomEvaluator::new());

        let result = opt.optimize("mugs", Template::default(), 5).await;

        assert!(matches!(result, Err(CopytuneError::Service(_))));
        assert_eq!(client.call_count(), 3);
    }

    #[test]
    fn test_default_config() {
        assert_eq!(OptimizerConfig::default().copies_per_round, DEFAULT_COPIES_PER_ROUND);
    }
}
