//! Provider abstractions for embeddings, LLM, chunk storage, and messages
//!
//! Trait-based seams around every external collaborator the core talks to,
//! so that hosted backends (Gemini) and in-memory doubles are interchangeable.

pub mod chunk_store;
pub mod embedding;
pub mod gemini;
pub mod llm;
pub mod memory;
pub mod message_store;

pub use chunk_store::ChunkStoreProvider;
pub use embedding::EmbeddingProvider;
pub use gemini::GeminiClient;
pub use llm::{LlmProvider, LlmStream, StreamEvent, ToolCall, ToolDefinition};
pub use memory::{MemoryChunkStore, MemoryMessageStore};
pub use message_store::MessageStoreProvider;
