//! Chat message model.

use serde::{Deserialize, Serialize};

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the person using the widget.
    User,
    /// Reply from the assistant, or the fallback text on delivery failure.
    Bot,
}

impl Sender {
    /// CSS class applied to this sender's message node.
    #[must_use]
    pub fn css_class(self) -> &'static str {
        match self {
            Self::User => "chat-user",
            Self::Bot => "chat-bot",
        }
    }
}

/// A single entry in the message list.
///
/// Messages are created once and appended; the list never mutates or
/// removes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Text shown in the node.
    pub content: String,
    /// Author of the message.
    pub sender: Sender,
}

impl ChatMessage {
    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::User,
        }
    }

    /// Create a bot message.
    #[must_use]
    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: Sender::Bot,
        }
    }
}
