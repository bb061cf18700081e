//! Conversation state: messages and the currently streaming reply.
//!
//! Every mutation after creation addresses a message by id and is a no-op
//! when that message is gone, so late stream deltas or image results
//! cannot resurrect a cleared conversation.

use jarvis_ai::Role;
use serde::{Deserialize, Serialize};

/// Message identifier, unique within a conversation
pub type MessageId = String;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub content: String,
    /// Image the user attached, as a data URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_image: Option<String>,
    /// Image generated for this reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_image: Option<String>,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            input_image: None,
            generated_image: None,
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn user(content: impl Into<String>, input_image: Option<String>) -> Self {
        Self {
            input_image,
            ..Self::new(Role::User, content)
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    /// Assistant message currently receiving deltas
    streaming: Option<MessageId>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted messages.
    pub fn from_messages(messages: Vec<Message>) -> Self {
        Self {
            messages,
            streaming: None,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Append an empty assistant message and mark it as streaming.
    pub fn begin_reply(&mut self) -> MessageId {
        let message = Message::assistant("");
        let id = message.id.clone();
        self.messages.push(message);
        self.streaming = Some(id.clone());
        id
    }

    /// Stop streaming into `id`. Ignored if another reply is streaming.
    pub fn end_reply(&mut self, id: &str) {
        if self.streaming.as_deref() == Some(id) {
            self.streaming = None;
        }
    }

    pub fn streaming(&self) -> Option<&str> {
        self.streaming.as_deref()
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming.is_some()
    }

    /// Append a delta to message `id`. Returns false if it no longer exists.
    pub fn append_content(&mut self, id: &str, delta: &str) -> bool {
        match self.get_mut(id) {
            Some(m) => {
                m.content.push_str(delta);
                true
            }
            None => false,
        }
    }

    /// Replace the content of message `id`. Returns false if it no longer exists.
    pub fn set_content(&mut self, id: &str, content: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(m) => {
                m.content = content.into();
                true
            }
            None => false,
        }
    }

    /// Attach a generated image to message `id`. Returns false if it no
    /// longer exists.
    pub fn attach_image(&mut self, id: &str, image: impl Into<String>) -> bool {
        match self.get_mut(id) {
            Some(m) => {
                m.generated_image = Some(image.into());
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.streaming = None;
    }
}
