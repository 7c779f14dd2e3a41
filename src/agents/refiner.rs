//! Template refinement from A/B feedback.

use std::sync::Arc;

use log::{debug, info};

use super::{Candidate, ScoreMap};
use crate::error::{CopytuneError, Result};
use crate::llm::{GenerationRequest, TextGenerator};
use crate::prompt::{DEFAULT_FEEDBACK_PROMPT, FeedbackContext, PromptRenderer, Template};

const FEEDBACK_TEMPLATE: &str = "feedback";

/// Result of one refinement: the winning candidate and the proposed template.
#[derive(Debug, Clone, PartialEq)]
pub struct Refinement {
    pub best_copy: Candidate,
    pub best_score: f64,
    pub template: Template,
}

/// Asks the model for a better template given the best-performing copy.
pub struct Refiner<C: TextGenerator> {
    client: Arc<C>,
    model: Option<String>,
    renderer: PromptRenderer,
}

impl<C: TextGenerator> Refiner<C> {
    /// Create a refiner using the built-in feedback prompt.
    pub fn new(client: Arc<C>) -> Result<Self> {
        Self::with_feedback_prompt(client, DEFAULT_FEEDBACK_PROMPT)
    }

    /// Create a refiner with a custom Handlebars feedback prompt.
    ///
    /// The prompt may reference `{{best_copy}}` and `{{template}}`.
    pub fn with_feedback_prompt(client: Arc<C>, feedback_prompt: &str) -> Result<Self> {
        let mut renderer = PromptRenderer::new();
        renderer.register_template(FEEDBACK_TEMPLATE, feedback_prompt)?;
        Ok(Self {
            client,
            model: None,
            renderer,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Propose a replacement for `template` from the scored candidates.
    pub async fn improve(&self, template: &Template, scores: &ScoreMap) -> Result<Template> {
        Ok(self.refine(template, scores).await?.template)
    }

    /// Like `improve`, also reporting which candidate the feedback was built from.
    pub async fn refine(&self, template: &Template, scores: &ScoreMap) -> Result<Refinement> {
        let (best_copy, best_score) = best_candidate(scores)?;
        info!("Best copy scored {:.3}: {}", best_score, best_copy);

        let prompt = self.feedback_prompt(template, best_copy)?;
        debug!("Feedback prompt: {}", prompt);

        let mut request = GenerationRequest::new(prompt);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        let response = self.client.generate(request).await?;
        Ok(Refinement {
            best_copy: best_copy.clone(),
            best_score,
            template: Template::new(response.output_text.trim()),
        })
    }

    /// Render the prompt sent to the model for one refinement.
    pub fn feedback_prompt(&self, template: &Template, best_copy: &str) -> Result<String> {
        let context = FeedbackContext {
            best_copy,
            template: template.as_str(),
        };
        self.renderer.render_named(FEEDBACK_TEMPLATE, &context)
    }
}

/// The candidate holding the highest score.
///
/// When several candidates share the maximum, which one is returned follows
/// the map's iteration order and is not specified.
pub fn best_candidate(scores: &ScoreMap) -> Result<(&Candidate, f64)> {
    scores
        .iter()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(copy, score)| (copy, *score))
        .ok_or_else(|| CopytuneError::EmptyInput("no scored candidates to refine from".to_string()))
}
