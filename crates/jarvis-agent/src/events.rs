//! Conversation event types

use serde::{Deserialize, Serialize};

use crate::conversation::{Message, MessageId};

/// Events emitted while a conversation runs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JarvisEvent {
    /// A turn started
    TurnStart,

    /// The user message was appended
    UserMessage { message: Message },

    /// An empty assistant reply was appended and is about to stream
    AssistantStart { message_id: MessageId },

    /// Content arrived for an assistant reply
    Delta { message_id: MessageId, delta: String },

    /// The reply stopped streaming
    AssistantEnd { message_id: MessageId, content: String },

    /// An action confirmation or other spoken notice
    Notification { text: String },

    /// Image generation was requested for a reply
    ImageRequested { message_id: MessageId, prompt: String },

    /// A generated image was attached to a reply
    ImageAttached { message_id: MessageId, image: String },

    /// The reply was cut short by the user
    Aborted { message_id: MessageId },

    /// The conversation was emptied
    Cleared,

    /// Error occurred
    Error { message: String },

    /// The turn completed
    TurnEnd,
}

impl JarvisEvent {
    /// Check if this is a terminal event
    pub fn is_terminal(&self) -> bool {
        matches!(self, JarvisEvent::TurnEnd)
    }
}
