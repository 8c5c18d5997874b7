//! axora-chat: multi-persona chat core with retrieval-augmented generation
//! and an output safety gate.
//!
//! This crate is the library behind the Axora chat backend. It assembles
//! persona-scoped retrieval context, streams a hosted LLM, and runs the
//! generated answer through a post-hoc safety/domain gate before anything is
//! persisted or shown to a user. HTTP routing, auth, and prompt authoring
//! live outside this crate; the core is invoked through
//! [`orchestrator::ChatOrchestrator::process_chat_request`].

pub mod config;
pub mod error;
pub mod gate;
pub mod generation;
pub mod ingestion;
pub mod orchestrator;
pub mod persona;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::ChatConfig;
pub use error::{Error, Result};
pub use gate::{OutputGateResult, OutputGateService, SuggestedAction};
pub use ingestion::{ChunkOptions, DocumentChunk, DocumentChunker};
pub use orchestrator::ChatOrchestrator;
pub use persona::PersonaRegistry;
pub use retrieval::{NewChunk, RetrievalService};
pub use types::{
    chat::{ChatRequest, ChatResponse, Citation, StoredMessage},
    chunk::{KnowledgeChunk, RetrievalResult},
    persona::PersonaConfig,
};
