//! Chat message types for the storefront chat widget.
//!
//! A `ChatMessage` is one entry in the widget's ordered message list.
//! Bot replies start life as a pending placeholder carrying a `temp_id`
//! and are finalized exactly once with the real reply or a failure text.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// Text shown in a bot placeholder while the reply is being fetched.
pub const PLACEHOLDER_TEXT: &str = "Đang suy nghĩ...";

/// Substituted when the completion service answers with an empty reply.
pub const EMPTY_REPLY_FALLBACK: &str = "Xin lỗi, tôi không thể trả lời ngay lúc này.";

/// Shown when the completion service rejects our credentials.
pub const UNAUTHORIZED_TEXT: &str = "Không có quyền truy cập API. Vui lòng kiểm tra cấu hình.";

/// Shown on timeouts and transport failures.
pub const CONNECTIVITY_TEXT: &str = "Kết nối mạng có vấn đề. Vui lòng thử lại.";

/// Shown for every other failure.
pub const GENERIC_FAILURE_TEXT: &str = "Xin lỗi, có lỗi xảy ra. Vui lòng thử lại sau.";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SenderType {
    Guest,
    Bot,
    Admin,
}

impl fmt::Display for SenderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SenderType::Guest => write!(f, "GUEST"),
            SenderType::Bot => write!(f, "BOT"),
            SenderType::Admin => write!(f, "ADMIN"),
        }
    }
}

impl FromStr for SenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GUEST" => Ok(SenderType::Guest),
            "BOT" => Ok(SenderType::Bot),
            "ADMIN" => Ok(SenderType::Admin),
            other => Err(format!("invalid sender type: '{other}'")),
        }
    }
}

/// Delivery status of a message.
///
/// `Local` messages live only in the widget (guest sessions), `Sending`
/// is an in-flight member message, `Sent` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Local,
    Sending,
    Sent,
    Failed,
}

impl MessageStatus {
    /// Whether a message with this status may be finalized into `next`.
    ///
    /// Status only moves forward: `local|sending -> sent|failed`. A guest
    /// placeholder is `local` and stays `local` once finalized.
    pub fn can_transition_to(self, next: MessageStatus) -> bool {
        matches!(
            (self, next),
            (
                MessageStatus::Local | MessageStatus::Sending,
                MessageStatus::Sent | MessageStatus::Failed
            ) | (MessageStatus::Local, MessageStatus::Local)
        )
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStatus::Local => write!(f, "local"),
            MessageStatus::Sending => write!(f, "sending"),
            MessageStatus::Sent => write!(f, "sent"),
            MessageStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(MessageStatus::Local),
            "sending" => Ok(MessageStatus::Sending),
            "sent" => Ok(MessageStatus::Sent),
            "failed" => Ok(MessageStatus::Failed),
            other => Err(format!("invalid message status: '{other}'")),
        }
    }
}

/// A single entry in the chat widget's message list.
///
/// Serialized with camelCase keys to match the storefront widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub sender_type: SenderType,
    pub message: String,
    /// Server-side conversation; never set on guest messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<i64>,
    #[serde(default)]
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Correlation key while the message is pending; cleared on finalization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_id: Option<String>,
    pub status: MessageStatus,
}

impl ChatMessage {
    /// A message is pending while it still carries its temporary id.
    pub fn is_pending(&self) -> bool {
        self.temp_id.is_some()
    }
}

/// Payload for durably storing a finalized bot reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBotMessage {
    pub conversation_id: i64,
    pub message: String,
    pub session_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placeholder() -> ChatMessage {
        ChatMessage {
            id: "ai-temp-1".to_string(),
            sender_type: SenderType::Bot,
            message: PLACEHOLDER_TEXT.to_string(),
            conversation_id: Some(42),
            session_id: Some("sess-1".to_string()),
            created_at: Utc::now(),
            temp_id: Some("ai-temp-1".to_string()),
            status: MessageStatus::Sending,
        }
    }

    #[test]
    fn test_status_forward_transitions() {
        assert!(MessageStatus::Sending.can_transition_to(MessageStatus::Sent));
        assert!(MessageStatus::Sending.can_transition_to(MessageStatus::Failed));
        assert!(MessageStatus::Local.can_transition_to(MessageStatus::Local));
        assert!(MessageStatus::Local.can_transition_to(MessageStatus::Failed));
    }

    #[test]
    fn test_status_rejects_backward_transitions() {
        assert!(!MessageStatus::Sent.can_transition_to(MessageStatus::Sending));
        assert!(!MessageStatus::Failed.can_transition_to(MessageStatus::Sent));
        assert!(!MessageStatus::Sending.can_transition_to(MessageStatus::Local));
        assert!(!MessageStatus::Sending.can_transition_to(MessageStatus::Sending));
        assert!(!MessageStatus::Sent.can_transition_to(MessageStatus::Sent));
    }

    #[test]
    fn test_sender_type_wire_format() {
        let json = serde_json::to_string(&SenderType::Bot).unwrap();
        assert_eq!(json, "\"BOT\"");
        assert_eq!("guest".parse::<SenderType>().unwrap(), SenderType::Guest);
        assert!("robot".parse::<SenderType>().is_err());
    }

    #[test]
    fn test_message_serializes_camel_case() {
        let json = serde_json::to_value(placeholder()).unwrap();
        assert_eq!(json["senderType"], "BOT");
        assert_eq!(json["conversationId"], 42);
        assert_eq!(json["tempId"], "ai-temp-1");
        assert_eq!(json["status"], "sending");
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_finalized_message_omits_temp_id() {
        let mut msg = placeholder();
        msg.temp_id = None;
        msg.conversation_id = None;
        msg.status = MessageStatus::Sent;
        assert!(!msg.is_pending());

        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("tempId").is_none());
        assert!(json.get("conversationId").is_none());
    }

    #[test]
    fn test_save_bot_message_wire_format() {
        let payload = SaveBotMessage {
            conversation_id: 12,
            message: "Rau cải hiện có giá 15.000đ/kg".to_string(),
            session_id: None,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["conversationId"], 12);
        assert!(json["sessionId"].is_null());
    }
}
