//! Semantic retrieval and chunk ingestion

mod service;

pub use service::{NewChunk, RetrievalService};
