//! LLM provider trait with a streaming generation contract

use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::persona::GenerationParams;
use crate::types::Attachment;

/// A tool/function call surfaced by the model mid-stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool name
    pub name: String,
    /// Call arguments as free-form JSON
    pub arguments: serde_json::Value,
}

/// A tool declaration passed through to the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON Schema for the arguments
    pub parameters: serde_json::Value,
}

/// One event in a streamed generation
///
/// The contract: zero or more `Token` (and `ToolCall`) events, then exactly
/// one terminal event — either `Done` carrying the full concatenated text, or
/// an `Err` item from the stream. Never both.
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A text fragment
    Token(String),
    /// A tool/function call request
    ToolCall(ToolCall),
    /// Terminal event with the full concatenated response
    Done(String),
}

/// Streamed generation events
pub type LlmStream = BoxStream<'static, Result<StreamEvent>>;

/// Trait for streaming LLM generation
///
/// Implementations:
/// - `GeminiClient`: hosted Gemini models via SSE streaming
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Start a streamed generation for one chat turn
    ///
    /// `tools` is passed through to the model when non-empty; this core does
    /// not execute tool calls, it only surfaces them as stream events.
    async fn stream_generate(
        &self,
        model: &str,
        system_prompt: &str,
        user_text: &str,
        attachments: &[Attachment],
        params: GenerationParams,
        tools: &[ToolDefinition],
    ) -> Result<LlmStream>;

    /// Check if the provider is healthy and available
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
