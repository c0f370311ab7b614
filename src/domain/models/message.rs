use std::fmt;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Author of a chat turn. Closed set: every entry in a conversation is
/// written either by the person typing or by the remote assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Wire-format role string expected by chat-completion endpoints.
    pub fn as_role(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_role())
    }
}

/// One unit of conversation.
///
/// Messages are created exactly once, when the user submits input or a
/// remote reply (or its fallback) arrives, and are never edited or removed
/// afterward. `id` is assigned by the owning [`Conversation`] and only used
/// for stable ordering and display keys.
///
/// [`Conversation`]: super::Conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    id: u64,
    text: String,
    sender: Sender,
    timestamp: DateTime<Local>,
}

impl Message {
    pub fn new(id: u64, text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id,
            text: text.into(),
            sender,
            timestamp: Local::now(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    pub fn is_user(&self) -> bool {
        self.sender == Sender::User
    }

    pub fn is_assistant(&self) -> bool {
        self.sender == Sender::Assistant
    }

    /// Local time-of-day string shown next to each rendered message.
    pub fn time_of_day(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sender_maps_to_wire_roles() {
        assert_eq!(Sender::User.as_role(), "user");
        assert_eq!(Sender::Assistant.as_role(), "assistant");
    }

    #[test]
    fn message_carries_text_verbatim() {
        let message = Message::new(7, "  Como lidar com a perda?  ", Sender::User);
        assert_eq!(message.id(), 7);
        assert_eq!(message.text(), "  Como lidar com a perda?  ");
        assert!(message.is_user());
        assert!(!message.is_assistant());
    }

    #[test]
    fn time_of_day_is_hours_and_minutes() {
        let message = Message::new(1, "oi", Sender::Assistant);
        let rendered = message.time_of_day();
        assert_eq!(rendered.len(), 5);
        assert_eq!(rendered.as_bytes()[2], b':');
    }
}
