//! OpenAI Responses API client implementation
//!
//! This module implements the TextGenerator trait for the OpenAI Responses API.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{Value, json};

use crate::error::{CopytuneError, Result};
use crate::llm::client::TextGenerator;
use crate::llm::types::{GenerationRequest, GenerationResponse, Usage};

/// OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default model to use
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Environment variable holding the API key
pub const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the OpenAI client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl OpenAiConfig {
    fn responses_url(&self) -> String {
        format!("{}/responses", self.base_url.trim_end_matches('/'))
    }
}

/// OpenAI API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
    usage: Arc<Mutex<Usage>>,
}

impl OpenAiClient {
    /// Create a client reading the API key from the named environment variable
    pub fn from_env(env_var: &str, config: OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var(env_var).map_err(|_| CopytuneError::Service(format!("{} not set", env_var)))?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CopytuneError::Service(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
            usage: Arc::new(Mutex::new(Usage::default())),
        })
    }

    /// Build the request body for the Responses API
    fn build_request(&self, request: &GenerationRequest) -> Value {
        let model = request.model.as_deref().unwrap_or(&self.config.model);

        json!({
            "model": model,
            "input": request.input
        })
    }

    /// Parse the API response into a GenerationResponse
    fn parse_response(&self, body: Value) -> Result<GenerationResponse> {
        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let message = error["message"].as_str().unwrap_or("unknown error");
            return Err(CopytuneError::Service(format!("API returned error: {}", message)));
        }

        let usage = if let Some(u) = body.get("usage") {
            Usage::new(
                u["input_tokens"].as_u64().unwrap_or(0),
                u["output_tokens"].as_u64().unwrap_or(0),
            )
        } else {
            Usage::default()
        };

        // Track cumulative usage
        if let Ok(mut total) = self.usage.lock() {
            total.add(&usage);
        }

        let output_text = match body["output_text"].as_str() {
            Some(text) => text.to_string(),
            None => collect_output_text(&body)?,
        };

        Ok(GenerationResponse { output_text, usage })
    }

    /// Send a request to the Responses API
    async fn send_request(&self, body: Value) -> Result<Value> {
        let response = self
            .client
            .post(self.config.responses_url())
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CopytuneError::Service(format!("Request failed: {}", e)))?;

        let status = response.status();

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(CopytuneError::Service(format!(
                "Rate limited, retry after {} seconds",
                retry_after
            )));
        }

        // Handle other errors
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(CopytuneError::Service(format!("API error {}: {}", status, error_body)));
        }

        response
            .json()
            .await
            .map_err(|e| CopytuneError::Service(format!("Failed to parse response: {}", e)))
    }

    /// Get cumulative token usage
    pub fn total_usage(&self) -> Usage {
        self.usage.lock().map(|u| *u).unwrap_or_default()
    }
}

/// Join the text parts of every message item in `output`
fn collect_output_text(body: &Value) -> Result<String> {
    let items = body["output"]
        .as_array()
        .ok_or_else(|| CopytuneError::Service("Response has neither output_text nor output".to_string()))?;

    let mut text = String::new();
    for item in items.iter().filter(|i| i["type"] == "message") {
        let Some(parts) = item["content"].as_array() else {
            continue;
        };
        for part in parts.iter().filter(|p| p["type"] == "output_text") {
            if let Some(t) = part["text"].as_str() {
                text.push_str(t);
            }
        }
    }

    Ok(text)
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        let body = self.build_request(&request);
        debug!("POST {} model={}", self.config.responses_url(), body["model"]);
        let response = self.send_request(body).await?;
        self.parse_response(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    fn is_ready(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
