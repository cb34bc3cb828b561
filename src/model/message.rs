//! Chat message types.
//!
//! Raw constructors are never exported - use smart constructors only.

use chrono::{DateTime, Utc};
use std::fmt;

// ===== MessageId =====

/// Identifier of a chat message within a transcript.
/// NEVER export the constructor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId(String);

impl MessageId {
    /// Smart constructor: validates non-empty ID
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidMessageId> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(InvalidMessageId::Empty);
        }
        Ok(Self(raw))
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Rejected message identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidMessageId {
    /// Identifier was the empty string.
    #[error("Message ID cannot be empty")]
    Empty,
}

// ===== ChatMessage =====

/// A single message in a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    id: MessageId,
    actor: String,
    body: String,
    timestamp: DateTime<Utc>,
    attachment: Option<String>,
    system: bool,
}

impl ChatMessage {
    /// Create a regular (non-system) message without attachment.
    pub fn new(
        id: MessageId,
        actor: impl Into<String>,
        body: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            actor: actor.into(),
            body: body.into(),
            timestamp,
            attachment: None,
            system: false,
        }
    }

    /// Attach a shared file whose preview is fetched lazily.
    pub fn with_attachment(mut self, name: impl Into<String>) -> Self {
        self.attachment = Some(name.into());
        self
    }

    /// Mark as a system message (join/leave notices, call events).
    ///
    /// System messages are never grouped with their neighbours.
    pub fn as_system(mut self) -> Self {
        self.system = true;
        self
    }

    /// Message identifier.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Display name of the author.
    pub fn actor(&self) -> &str {
        &self.actor
    }

    /// Message text.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Time the message was posted.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Attachment name, if any.
    pub fn attachment(&self) -> Option<&str> {
        self.attachment.as_deref()
    }

    /// Whether this is a system message.
    pub fn is_system(&self) -> bool {
        self.system
    }
}
