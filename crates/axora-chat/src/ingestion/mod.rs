//! Document chunking for embedding and retrieval

pub mod chunker;

pub use chunker::{ChunkOptions, DocumentChunk, DocumentChunker};
