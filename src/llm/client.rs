//! Text-generation client trait and a scripted mock implementation

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CopytuneError, Result};
use crate::llm::types::{GenerationRequest, GenerationResponse};

/// Stateless text-generation client - each call is independent
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one prompt and wait for the generated text
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse>;

    /// Model used when a request does not name one
    fn model(&self) -> &str;

    /// Whether the client is able to make calls
    fn is_ready(&self) -> bool {
        true
    }
}

type Responder = Box<dyn Fn(&GenerationRequest) -> Result<String> + Send + Sync>;

enum Script {
    Queue(Mutex<VecDeque<String>>),
    Function(Responder),
}

/// In-process client that replies from a script and records every request
pub struct MockTextGenerator {
    script: Script,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockTextGenerator {
    /// Reply with the given texts in order; fails once they run out
    pub fn new(responses: Vec<impl Into<String>>) -> Self {
        Self {
            script: Script::Queue(Mutex::new(
                responses.into_iter().map(|r| r.into()).collect::<VecDeque<String>>(),
            )),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Reply by calling `f` with each request
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(&GenerationRequest) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            script: Script::Function(Box::new(f)),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let text = match &self.script {
            Script::Queue(queue) => queue
                .lock()
                .map_err(|_| CopytuneError::Service("mock queue poisoned".to_string()))?
                .pop_front()
                .ok_or_else(|| CopytuneError::Service("mock has no scripted response left".to_string()))?,
            Script::Function(f) => f(&request)?,
        };

        Ok(GenerationResponse::text(text))
    }

    fn model(&self) -> &str {
        "mock-model"
    }
}

impl std::fmt::Debug for MockTextGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTextGenerator")
            .field("calls", &self.call_count())
            .finish()
    }
}
