//! LLM Client Layer - text-generation service integration
//!
//! This module provides:
//! - Request/response types for the service boundary
//! - TextGenerator trait for API abstraction
//! - OpenAiClient implementation
//! - MockTextGenerator for tests and offline runs

pub mod client;
pub mod openai;
pub mod types;

pub use client::{MockTextGenerator, TextGenerator};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use types::{GenerationRequest, GenerationResponse, Usage};
