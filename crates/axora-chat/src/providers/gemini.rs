//! Gemini API client for embeddings and streamed generation
//!
//! Talks to the Generative Language API over HTTPS: `embedContent` for
//! embeddings and `streamGenerateContent` (SSE) for token streaming.

use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_stream::wrappers::ReceiverStream;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::types::persona::GenerationParams;
use crate::types::Attachment;

use super::embedding::EmbeddingProvider;
use super::llm::{LlmProvider, LlmStream, StreamEvent, ToolCall, ToolDefinition};

/// Gemini API client with automatic retry
pub struct GeminiClient {
    client: reqwest::Client,
    config: LlmConfig,
    embed_model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ToolDeclarations>>,
}

#[derive(Serialize)]
struct ToolDeclarations {
    #[serde(rename = "functionDeclarations")]
    function_declarations: Vec<ToolDefinition>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    Inline {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<ResponseContent>,
}

#[derive(Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
    #[serde(rename = "functionCall", default)]
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Serialize)]
struct EmbedRequest {
    content: EmbedContent,
}

#[derive(Serialize)]
struct EmbedContent {
    parts: Vec<EmbedPart>,
}

#[derive(Serialize)]
struct EmbedPart {
    text: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: EmbeddingValues,
}

#[derive(Deserialize)]
struct EmbeddingValues {
    values: Vec<f32>,
}

impl GeminiClient {
    /// Create a new client with retry support
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .unwrap_or_default();

        Self {
            client,
            config: llm.clone(),
            embed_model: embeddings.model.clone(),
            dimensions: embeddings.dimensions,
        }
    }

    fn generate_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            self.config.base_url, model, self.config.api_key
        )
    }

    fn embed_url(&self) -> String {
        format!(
            "{}/models/{}:embedContent?key={}",
            self.config.base_url, self.embed_model, self.config.api_key
        )
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.config.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            attempt = attempt + 1,
                            max = self.config.max_retries + 1,
                            delay_secs = delay.as_secs(),
                            "Gemini request failed, retrying"
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::Llm("Unknown error".to_string())))
    }

    fn attachment_part(attachment: &Attachment) -> Part {
        let (data, mime, default_mime) = match attachment {
            Attachment::Image { data, mime } => (data, mime, "image/jpeg"),
            Attachment::Audio { data, mime } => (data, mime, "audio/mpeg"),
            Attachment::Pdf { data, mime } => (data, mime, "application/pdf"),
        };
        Part::Inline {
            inline_data: InlineData {
                mime_type: mime.clone().unwrap_or_else(|| default_mime.to_string()),
                data: data.clone(),
            },
        }
    }

    /// Forward decoded SSE events from the HTTP response into the channel.
    ///
    /// Emits Token/ToolCall events as chunks arrive and a single terminal
    /// Done carrying the concatenated text once the body ends.
    async fn pump_stream(
        response: reqwest::Response,
        tx: mpsc::Sender<Result<StreamEvent>>,
    ) {
        let mut body = response.bytes_stream();
        let mut buffer = String::new();
        let mut full_text = String::new();

        while let Some(next) = body.next().await {
            let bytes = match next {
                Ok(bytes) => bytes,
                Err(e) => {
                    let _ = tx
                        .send(Err(Error::Llm(format!("Stream read failed: {}", e))))
                        .await;
                    return;
                }
            };

            buffer.push_str(&String::from_utf8_lossy(&bytes));

            // SSE frames are newline-delimited; data lines carry JSON chunks
            while let Some(newline) = buffer.find('\n') {
                let line = buffer[..newline].trim().to_string();
                buffer.drain(..=newline);

                let Some(payload) = line.strip_prefix("data:") else {
                    continue;
                };
                let payload = payload.trim();
                if payload.is_empty() {
                    continue;
                }

                let chunk: StreamChunk = match serde_json::from_str(payload) {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        tracing::warn!(error = %e, "Skipping unparseable stream chunk");
                        continue;
                    }
                };

                for candidate in chunk.candidates {
                    let Some(content) = candidate.content else {
                        continue;
                    };
                    for part in content.parts {
                        if let Some(text) = part.text {
                            if !text.is_empty() {
                                full_text.push_str(&text);
                                if tx.send(Ok(StreamEvent::Token(text))).await.is_err() {
                                    return;
                                }
                            }
                        }
                        if let Some(call) = part.function_call {
                            let event = StreamEvent::ToolCall(ToolCall {
                                name: call.name,
                                arguments: call.args,
                            });
                            if tx.send(Ok(event)).await.is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        }

        let _ = tx.send(Ok(StreamEvent::Done(full_text))).await;
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = self.embed_url();
        let text = text.to_string();

        self.retry_request(|| {
            let url = url.clone();
            let text = text.clone();
            let client = self.client.clone();

            async move {
                let request = EmbedRequest {
                    content: EmbedContent {
                        parts: vec![EmbedPart { text }],
                    },
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::Embedding(format!("Embedding request failed: {}", e)))?;

                if !response.status().is_success() {
                    return Err(Error::Embedding(format!(
                        "Embedding failed: HTTP {}",
                        response.status()
                    )));
                }

                let embed_response: EmbedResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::Embedding(format!("Invalid embedding response: {}", e)))?;

                Ok(embed_response.embedding.values)
            }
        })
        .await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models?key={}", self.config.base_url, self.config.api_key);
        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

#[async_trait]
impl LlmProvider for GeminiClient {
    async fn stream_generate(
        &self,
        model: &str,
        system_prompt: &str,
        user_text: &str,
        attachments: &[Attachment],
        params: GenerationParams,
        tools: &[ToolDefinition],
    ) -> Result<LlmStream> {
        let mut parts = vec![Part::Text {
            text: user_text.to_string(),
        }];
        parts.extend(attachments.iter().map(Self::attachment_part));

        let request = GenerateRequest {
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part::Text {
                    text: system_prompt.to_string(),
                }],
            }),
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                max_output_tokens: params.max_output_tokens,
            },
            tools: if tools.is_empty() {
                None
            } else {
                Some(vec![ToolDeclarations {
                    function_declarations: tools.to_vec(),
                }])
            },
        };

        let response = self
            .client
            .post(self.generate_url(model))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("Gemini request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Llm(format!(
                "Gemini generation failed ({}): {}",
                status, body
            )));
        }

        let (tx, rx) = mpsc::channel(32);
        tokio::spawn(Self::pump_stream(response, tx));

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn health_check(&self) -> Result<bool> {
        EmbeddingProvider::health_check(self).await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
