//! Copy generation - turns a template into candidate marketing copies.

use std::sync::Arc;

use log::{debug, info};

use super::Candidate;
use crate::error::{CopytuneError, Result};
use crate::llm::{GenerationRequest, TextGenerator};
use crate::prompt::Template;

/// Generates candidate copies for a product by prompting the model.
pub struct CopyWriter<C: TextGenerator> {
    client: Arc<C>,
    model: Option<String>,
}

impl<C: TextGenerator> CopyWriter<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self { client, model: None }
    }

    /// Use a specific model instead of the client's default.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Return at most `count` candidate copies produced from `template`.
    ///
    /// Fewer candidates come back when the model produces fewer usable lines.
    pub async fn generate(&self, product: &str, template: &Template, count: usize) -> Result<Vec<Candidate>> {
        if count == 0 {
            return Err(CopytuneError::InvalidArgument(
                "copy count must be at least 1".to_string(),
            ));
        }

        let prompt = template.format(product, count)?;
        debug!("Generation prompt: {}", prompt);

        let mut request = GenerationRequest::new(prompt);
        if let Some(model) = &self.model {
            request = request.with_model(model.clone());
        }

        let response = self.client.generate(request).await?;
        debug!("Generation response: {:?}", response.output_text);

        let candidates = parse_candidates(&response.output_text, count);
        info!("Generated {} of {} requested copies for {}", candidates.len(), count, product);
        Ok(candidates)
    }
}

/// Best-effort cleanup of model output into one candidate per line.
///
/// Each line loses any leading and trailing `-` and space characters; lines
/// left blank are dropped. At most `limit` lines are kept, in order.
pub fn parse_candidates(text: &str, limit: usize) -> Vec<Candidate> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_matches(|c: char| c == '-' || c == ' ').to_string())
        .filter(|line| !line.trim().is_empty())
        .take(limit)
        .collect()
}
