//! Chat history records as returned by the completion provider.
//!
//! One record is one past exchange: the user's text and the bot's reply,
//! either of which may be missing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A past exchange from the provider's history endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: i64,
    #[serde(default)]
    pub user_message: Option<String>,
    #[serde(default)]
    pub ai_response: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_deserialize_partial() {
        let json = r#"{"id": 7, "user_message": "xin chào", "created_at": "2026-01-02T03:04:05Z"}"#;
        let record: HistoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 7);
        assert_eq!(record.user_message.as_deref(), Some("xin chào"));
        assert!(record.ai_response.is_none());
        assert!(record.session_id.is_none());
    }
}
