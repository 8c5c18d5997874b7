//! Message store provider trait for append-only message persistence

use async_trait::async_trait;

use crate::error::Result;
use crate::types::chat::StoredMessage;

/// Trait for message persistence
///
/// The core only appends; reads and updates happen outside this boundary.
///
/// Implementations:
/// - `MemoryMessageStore`: in-process store for local use and tests
#[async_trait]
pub trait MessageStoreProvider: Send + Sync {
    /// Append a message, returning its generated identifier
    async fn append(&self, message: &StoredMessage) -> Result<String>;

    /// Check if the provider is healthy
    async fn health_check(&self) -> Result<bool>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
