//! Chat domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use nexus_core::MessageId;

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Ai,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message ID.
    pub id: MessageId,
    /// Author of the message.
    pub sender: Sender,
    /// Plain-text content.
    pub content: String,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// Create a message stamped with the current time.
    #[must_use]
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: MessageId::generate(),
            sender,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Ordered messages of one chat page visit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Append a message to the end of the conversation.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Messages in the order they were appended.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_keeps_order() {
        let mut conversation = Conversation::default();
        conversation.push(ChatMessage::new(Sender::User, "first"));
        conversation.push(ChatMessage::new(Sender::Ai, "second"));

        let contents: Vec<&str> = conversation
            .messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect();
        assert_eq!(contents, ["first", "second"]);
    }

    #[test]
    fn test_message_serialization() {
        let message = ChatMessage::new(Sender::Ai, "Hello");
        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"sender\":\"ai\""));
        assert!(json.contains("\"content\":\"Hello\""));
    }
}
