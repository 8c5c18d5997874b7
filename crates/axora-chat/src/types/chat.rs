//! Chat request/response value objects and persisted message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One chat turn as received from the (external) API layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation this turn belongs to
    pub conversation_id: String,
    /// Persona the user selected
    pub persona_key: String,
    /// User message text
    pub text: String,
    /// Attached uploads, resolved by the caller
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Caller identity
    pub user_id: String,
}

/// An attachment carried with a user message
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Attachment {
    /// Inline image data
    Image {
        /// Base64-encoded bytes
        data: String,
        /// MIME type (defaults to image/jpeg at the provider)
        mime: Option<String>,
    },
    /// Inline audio data
    Audio {
        /// Base64-encoded bytes
        data: String,
        /// MIME type
        mime: Option<String>,
    },
    /// Inline PDF data
    Pdf {
        /// Base64-encoded bytes
        data: String,
        /// MIME type (defaults to application/pdf at the provider)
        mime: Option<String>,
    },
}

/// Result of one chat turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Whether the turn completed
    pub success: bool,
    /// ID of the persisted assistant message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Final assistant message text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Error description when `success` is false
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    /// A successful turn
    pub fn ok(message_id: String, message: String) -> Self {
        Self {
            success: true,
            message_id: Some(message_id),
            message: Some(message),
            error: None,
        }
    }

    /// A failed turn
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message_id: None,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// Role of a stored message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User-authored message
    User,
    /// Assistant-authored message
    Assistant,
}

/// Citation persisted alongside an assistant message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Citation {
    /// Source document identifier
    pub source_id: String,
    /// Source title, if known
    pub title: Option<String>,
    /// Source URL, if known
    pub url: Option<String>,
}

/// Message record appended to the message store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Conversation this message belongs to
    pub conversation_id: String,
    /// Author role
    pub role: MessageRole,
    /// Message text
    pub text: String,
    /// Citations backing the message
    #[serde(default)]
    pub citations: Vec<Citation>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl StoredMessage {
    /// Create an assistant message stamped with the current time
    pub fn assistant(
        conversation_id: impl Into<String>,
        text: impl Into<String>,
        citations: Vec<Citation>,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            role: MessageRole::Assistant,
            text: text.into(),
            citations,
            created_at: Utc::now(),
        }
    }
}
