//! Core types for personas, knowledge chunks, and chat turns

pub mod chat;
pub mod chunk;
pub mod persona;

pub use chat::{Attachment, ChatRequest, ChatResponse, Citation, MessageRole, StoredMessage};
pub use chunk::{
    ChunkPosition, CollectionStats, KnowledgeChunk, RetrievalResult, ScoredChunk,
};
pub use persona::{GenerationParams, Guardrails, ModelRef, PersonaConfig, RetrievalSettings};
