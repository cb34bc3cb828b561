//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod conversation;
pub mod error;
pub mod message;
pub mod position;

// Re-export for convenience
pub use conversation::{
    Conversation, ConversationRow, GroupingRules, RowKind, DEFAULT_GROUP_WINDOW,
    DEFAULT_MAX_GROUP_SIZE,
};
pub use error::{AppError, InputError, ParseError};
pub use message::{ChatMessage, InvalidMessageId, MessageId};
pub use position::RowPosition;
