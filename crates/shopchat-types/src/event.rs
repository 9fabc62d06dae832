//! Observer events emitted by a chat instance.
//!
//! Published on the chat's event bus so UIs (the REST surface, the CLI
//! spinner) can follow message-list and typing changes without polling.

use serde::{Deserialize, Serialize};

use crate::message::ChatMessage;

/// A change to a chat instance's observable state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message was appended to the end of the list.
    MessageAppended { message: ChatMessage },

    /// The pending message with `temp_id` was finalized.
    MessageReplaced { temp_id: String, message: ChatMessage },

    /// The whole list was replaced (history load).
    MessagesReset { count: usize },

    /// The bot typing indicator changed.
    TypingChanged { bot: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_event_serde() {
        let event = ChatEvent::TypingChanged { bot: true };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"typing_changed","bot":true}"#);
        let parsed: ChatEvent = serde_json::from_str(&json).unwrap();
        assert!(matches!(parsed, ChatEvent::TypingChanged { bot: true }));
    }

    #[test]
    fn test_reset_event_tag() {
        let json = serde_json::to_value(ChatEvent::MessagesReset { count: 3 }).unwrap();
        assert_eq!(json["type"], "messages_reset");
        assert_eq!(json["count"], 3);
    }
}
