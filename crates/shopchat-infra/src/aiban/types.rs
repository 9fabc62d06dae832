//! Wire types for the aiban.vn chat API.

use serde::{Deserialize, Serialize};
use shopchat_types::history::HistoryRecord;

/// Body of `POST /chat`.
#[derive(Debug, Serialize)]
pub struct AibanChatRequest<'a> {
    pub bot_id: i64,
    pub message: &'a str,
    pub session_id: Option<&'a str>,
}

/// Successful `POST /chat` response.
///
/// Only `response` is read; other provider fields are ignored.
#[derive(Debug, Deserialize)]
pub struct AibanChatResponse {
    #[serde(default)]
    pub response: Option<String>,
}

/// `GET /chat/history` response.
#[derive(Debug, Deserialize)]
pub struct AibanHistoryResponse {
    #[serde(default)]
    pub data: Option<Vec<HistoryRecord>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serializes_null_session() {
        let body = AibanChatRequest {
            bot_id: 5,
            message: "xin chào",
            session_id: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["bot_id"], 5);
        assert_eq!(json["message"], "xin chào");
        assert!(json["session_id"].is_null());
    }

    #[test]
    fn test_response_without_reply_field() {
        let parsed: AibanChatResponse = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert!(parsed.response.is_none());
    }

    #[test]
    fn test_history_response_without_data() {
        let parsed: AibanHistoryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.data.is_none());
    }
}
