//! Request and response types for the text-generation service
//!
//! The service contract is deliberately small: a model identifier and a
//! single input string go out, a single generated text comes back.

use serde::{Deserialize, Serialize};

/// Request to the text-generation service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Model override; the client's configured model is used when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub input: String,
}

impl GenerationRequest {
    /// Create a request for the given input text
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            model: None,
            input: input.into(),
        }
    }

    /// Set the model for this request
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Response from the text-generation service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub output_text: String,
    pub usage: Usage,
}

impl GenerationResponse {
    /// Create a response carrying only text
    pub fn text(output_text: impl Into<String>) -> Self {
        Self {
            output_text: output_text.into(),
            usage: Usage::default(),
        }
    }
}

/// Token usage for a call, or accumulated over several calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl Usage {
    pub fn new(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens,
            output_tokens,
        }
    }

    /// Add another usage into this one
    pub fn add(&mut self, other: &Usage) {
        self.input_tokens += other.input_tokens;
        self.output_tokens += other.output_tokens;
    }

    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}
