//! Chat orchestrator: end-to-end handling of one chat turn
//!
//! Wires persona lookup, retrieval, prompt assembly, LLM streaming, the
//! output gate, and message persistence. The public contract is that
//! `process_chat_request` always resolves to a `ChatResponse` — every
//! internal failure is converted to either a fallback message or a
//! `success: false` response, never a propagated error.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use tracing::{error, info, warn};

use crate::config::ChatConfig;
use crate::gate::{OutputGateService, SuggestedAction};
use crate::generation::PromptBuilder;
use crate::persona::PersonaRegistry;
use crate::providers::{LlmProvider, MessageStoreProvider, StreamEvent, ToolDefinition};
use crate::retrieval::RetrievalService;
use crate::types::chat::{ChatRequest, ChatResponse, Citation, StoredMessage};
use crate::types::chunk::RetrievalResult;
use crate::types::persona::PersonaConfig;

/// Shown when the model stream fails or times out
const CONNECTIVITY_MESSAGE: &str = "I'm having trouble generating a response \
right now. Please try again in a moment.";

/// Shown when the model stream completes but produced no text
const EMPTY_RESPONSE_MESSAGE: &str = "I'm sorry, I wasn't able to generate a \
response to that. Could you try rephrasing your question?";

pub struct ChatOrchestrator {
    personas: Arc<PersonaRegistry>,
    retrieval: Arc<RetrievalService>,
    gate: OutputGateService,
    llm: Arc<dyn LlmProvider>,
    messages: Arc<dyn MessageStoreProvider>,
    prompt: PromptBuilder,
    /// Tool declarations available for pass-through, filtered per persona
    tool_catalog: Vec<ToolDefinition>,
    retrieval_timeout: Duration,
    stream_deadline: Duration,
}

impl ChatOrchestrator {
    pub fn new(
        personas: Arc<PersonaRegistry>,
        retrieval: Arc<RetrievalService>,
        llm: Arc<dyn LlmProvider>,
        messages: Arc<dyn MessageStoreProvider>,
        config: &ChatConfig,
    ) -> Self {
        Self {
            personas,
            retrieval,
            gate: OutputGateService::new(),
            llm,
            messages,
            prompt: PromptBuilder::new(),
            tool_catalog: Vec::new(),
            retrieval_timeout: Duration::from_secs(config.retrieval.timeout_secs),
            stream_deadline: Duration::from_secs(config.llm.stream_deadline_secs),
        }
    }

    /// Declare tools that personas may enable. Calls are surfaced to the
    /// model only; this core never executes them.
    pub fn with_tool_catalog(mut self, catalog: Vec<ToolDefinition>) -> Self {
        self.tool_catalog = catalog;
        self
    }

    /// Handle one chat turn. Always resolves to a `ChatResponse`.
    pub async fn process_chat_request(&self, request: ChatRequest) -> ChatResponse {
        let Some(persona) = self.personas.get(&request.persona_key) else {
            warn!(persona = %request.persona_key, "unknown persona key");
            return ChatResponse::failure(format!(
                "unknown persona: {}",
                request.persona_key
            ));
        };

        info!(
            conversation = %request.conversation_id,
            persona = %persona.key,
            "processing chat request"
        );

        let results = self.retrieve_context(persona, &request.text).await;
        let system_prompt = self.prompt.build_system_prompt(persona, &results);
        let tools = self.tools_for(persona);

        let (final_text, citations) = match self
            .generate(persona, &system_prompt, &request, &tools)
            .await
        {
            Ok(text) => {
                let text = if text.trim().is_empty() {
                    warn!(persona = %persona.key, "model returned an empty response");
                    EMPTY_RESPONSE_MESSAGE.to_string()
                } else {
                    text
                };
                self.apply_gate(persona, &request.text, text, &results)
            }
            Err(err) => {
                // The connectivity message is a synthesized constant, not
                // model output; it skips the gate and carries no citations.
                error!(persona = %persona.key, error = %err, "generation failed");
                (CONNECTIVITY_MESSAGE.to_string(), Vec::new())
            }
        };

        let record = StoredMessage::assistant(&request.conversation_id, &final_text, citations);
        match self.messages.append(&record).await {
            Ok(message_id) => ChatResponse::ok(message_id, final_text),
            Err(err) => {
                error!(
                    conversation = %request.conversation_id,
                    error = %err,
                    "failed to persist assistant message"
                );
                ChatResponse::failure("failed to persist assistant message")
            }
        }
    }

    /// Retrieval with a deadline. Failure or timeout degrades to empty
    /// context; the turn continues.
    async fn retrieve_context(
        &self,
        persona: &PersonaConfig,
        query: &str,
    ) -> Vec<RetrievalResult> {
        let search = self.retrieval.search(
            query,
            &persona.retrieval.collections,
            persona.retrieval.top_k,
        );
        match tokio::time::timeout(self.retrieval_timeout, search).await {
            Ok(Ok(results)) => results,
            Ok(Err(err)) => {
                warn!(persona = %persona.key, error = %err, "retrieval failed, continuing without context");
                Vec::new()
            }
            Err(_) => {
                warn!(persona = %persona.key, "retrieval timed out, continuing without context");
                Vec::new()
            }
        }
    }

    /// Stream the model and accumulate the full response under a deadline
    async fn generate(
        &self,
        persona: &PersonaConfig,
        system_prompt: &str,
        request: &ChatRequest,
        tools: &[ToolDefinition],
    ) -> crate::error::Result<String> {
        let generation = async {
            let mut stream = self
                .llm
                .stream_generate(
                    &persona.model.name,
                    system_prompt,
                    &request.text,
                    &request.attachments,
                    persona.generation.clone(),
                    tools,
                )
                .await?;

            let mut accumulated = String::new();
            while let Some(event) = stream.next().await {
                match event? {
                    StreamEvent::Token(token) => accumulated.push_str(&token),
                    StreamEvent::ToolCall(call) => {
                        info!(persona = %persona.key, tool = %call.name, "model requested a tool call");
                    }
                    StreamEvent::Done(full) => return Ok(full),
                }
            }
            // Stream ended without a terminal event; use what we have.
            Ok(accumulated)
        };

        match tokio::time::timeout(self.stream_deadline, generation).await {
            Ok(result) => result,
            Err(_) => Err(crate::error::Error::llm("generation stream deadline exceeded")),
        }
    }

    /// Run the gate and resolve the final text and citations
    fn apply_gate(
        &self,
        persona: &PersonaConfig,
        query: &str,
        text: String,
        results: &[RetrievalResult],
    ) -> (String, Vec<Citation>) {
        let verdict = self.gate.check_response(persona, query, &text, results);
        if !verdict.allowed {
            info!(
                persona = %persona.key,
                reason = ?verdict.reason,
                "response refused by output gate"
            );
            return (self.gate.refusal_message(persona), Vec::new());
        }

        let final_text = match verdict.suggested_action {
            Some(SuggestedAction::AddDisclaimer) => verdict.modified_response.unwrap_or(text),
            _ => text,
        };
        (final_text, build_citations(results))
    }

    fn tools_for(&self, persona: &PersonaConfig) -> Vec<ToolDefinition> {
        self.tool_catalog
            .iter()
            .filter(|t| persona.enabled_tools.contains(&t.name))
            .cloned()
            .collect()
    }
}

/// One citation per distinct source document, in rank order
fn build_citations(results: &[RetrievalResult]) -> Vec<Citation> {
    let mut citations: Vec<Citation> = Vec::new();
    for result in results {
        if citations.iter().any(|c| c.source_id == result.doc_id) {
            continue;
        }
        citations.push(Citation {
            source_id: result.doc_id.clone(),
            title: result.title.clone(),
            url: result.url.clone(),
        });
    }
    citations
}
