//! Prompt Renderer - Render feedback prompts with context variables using Handlebars
//!
//! Feedback prompts are Handlebars templates. Rendering is strict: a
//! template referencing a variable absent from the context is an error.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::{CopytuneError, Result};

/// Feedback prompt sent to the refiner, as a Handlebars template
pub const DEFAULT_FEEDBACK_PROMPT: &str = "The following marketing copy performed best in an A/B test:\n\
{{best_copy}}\n\n\
Original prompt template:\n\
{{template}}\n\n\
Suggest an improved prompt template that could yield better copies.";

/// Variables available to a feedback prompt
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackContext<'a> {
    pub best_copy: &'a str,
    pub template: &'a str,
}

/// Renders prompt templates using Handlebars templating
pub struct PromptRenderer {
    handlebars: Handlebars<'static>,
}

impl Default for PromptRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PromptRenderer {
    /// Create a new PromptRenderer with default settings
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        // Prompts are plain text, never HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        Self { handlebars }
    }

    /// Register a named template for later use
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| CopytuneError::Format(format!("Failed to register prompt '{}': {}", name, e)))
    }

    /// Render a previously registered template
    pub fn render_named<T: Serialize>(&self, name: &str, context: &T) -> Result<String> {
        self.handlebars
            .render(name, context)
            .map_err(|e| CopytuneError::Format(format!("Failed to render prompt '{}': {}", name, e)))
    }
}
