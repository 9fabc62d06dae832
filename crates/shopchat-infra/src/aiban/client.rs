//! AibanClient -- [`CompletionService`] and [`HistoryService`] over the
//! aiban.vn REST API.
//!
//! The bearer token is wrapped in [`secrecy::SecretString`] and is only
//! exposed when building the `Authorization` header. A missing token fails
//! the completion call before any request is made.

use std::time::Duration;

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};

use shopchat_core::service::completion::CompletionService;
use shopchat_core::service::history::HistoryService;
use shopchat_types::config::AiConfig;
use shopchat_types::error::{CompletionError, HistoryError};
use shopchat_types::history::HistoryRecord;

use super::types::{AibanChatRequest, AibanChatResponse, AibanHistoryResponse};

/// Client for the aiban.vn chat API.
pub struct AibanClient {
    client: reqwest::Client,
    base_url: String,
    bot_id: i64,
    token: Option<SecretString>,
}

impl AibanClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - API root, e.g. `https://api.aiban.vn/api/v1`
    /// * `bot_id` - provider-side bot answering for this storefront
    /// * `token` - bearer token; `None` makes every completion fail fast
    pub fn new(base_url: String, bot_id: i64, token: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bot_id,
            token,
        }
    }

    /// Build a client from the `[ai]` config section.
    pub fn from_config(config: &AiConfig) -> Self {
        let token = config
            .token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.clone()));
        Self::new(config.base_url.clone(), config.bot_id, token)
    }

    pub fn bot_id(&self) -> i64 {
        self.bot_id
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn transport_error(e: reqwest::Error) -> CompletionError {
    if e.is_timeout() {
        CompletionError::Timeout
    } else {
        CompletionError::Network(e.to_string())
    }
}

impl CompletionService for AibanClient {
    async fn complete(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<Option<String>, CompletionError> {
        let token = self.token.as_ref().ok_or(CompletionError::MissingCredential)?;

        let body = AibanChatRequest {
            bot_id: self.bot_id,
            message,
            session_id,
        };

        let response = self
            .client
            .post(self.url("/chat"))
            .bearer_auth(token.expose_secret())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::debug!(status = status.as_u16(), "Completion request rejected");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CompletionError::Unauthorized {
                    status: status.as_u16(),
                    body: error_body,
                },
                StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
                    CompletionError::Timeout
                }
                _ => CompletionError::Status {
                    status: status.as_u16(),
                    body: error_body,
                },
            });
        }

        let parsed: AibanChatResponse = response.json().await.map_err(|e| {
            CompletionError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        Ok(parsed.response)
    }
}

impl HistoryService for AibanClient {
    async fn fetch_history(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let mut request = self
            .client
            .get(self.url("/chat/history"))
            .query(&[("bot_id", self.bot_id)])
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| HistoryError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::Status(status.as_u16()));
        }

        let parsed: AibanHistoryResponse = response
            .json()
            .await
            .map_err(|e| HistoryError::Deserialization(e.to_string()))?;

        Ok(parsed.data.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn client_for(server: &ServerGuard, token: Option<&str>) -> AibanClient {
        AibanClient::new(server.url(), 5, token.map(|t| SecretString::from(t.to_string())))
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_request() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/chat").expect(0).create_async().await;

        let client = client_for(&server, None);
        let err = client.complete("hi", None).await.unwrap_err();

        assert!(matches!(err, CompletionError::MissingCredential));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat")
            .match_header("authorization", "Bearer tok-1")
            .match_body(Matcher::Json(serde_json::json!({
                "bot_id": 5,
                "message": "giá rau cải bao nhiêu?",
                "session_id": "sess-9"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"response": "Rau cải hiện có giá 15.000đ/kg"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("tok-1"));
        let reply = client
            .complete("giá rau cải bao nhiêu?", Some("sess-9"))
            .await
            .unwrap();

        assert_eq!(reply.as_deref(), Some("Rau cải hiện có giá 15.000đ/kg"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_without_response_field() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"session_id": "x"}"#)
            .create_async()
            .await;

        let client = client_for(&server, Some("tok"));
        assert!(client.complete("hi", None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unauthorized_status() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(401)
            .with_body("invalid token")
            .create_async()
            .await;

        let client = client_for(&server, Some("bad"));
        let err = client.complete("hi", None).await.unwrap_err();

        match err {
            CompletionError::Unauthorized { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid token");
            }
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_keeps_body() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(500)
            .with_body("model crashed")
            .create_async()
            .await;

        let client = client_for(&server, Some("tok"));
        let err = client.complete("hi", None).await.unwrap_err();

        assert!(matches!(
            err,
            CompletionError::Status { status: 500, ref body } if body == "model crashed"
        ));
    }

    #[tokio::test]
    async fn test_gateway_timeout_is_timeout() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(504)
            .create_async()
            .await;

        let client = client_for(&server, Some("tok"));
        let err = client.complete("hi", None).await.unwrap_err();
        assert!(matches!(err, CompletionError::Timeout));
    }

    #[tokio::test]
    async fn test_malformed_body_is_deserialization_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = client_for(&server, Some("tok"));
        let err = client.complete("hi", None).await.unwrap_err();
        assert!(matches!(err, CompletionError::Deserialization(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let client = AibanClient::new(
            "http://127.0.0.1:1".to_string(),
            5,
            Some(SecretString::from("tok".to_string())),
        );
        let err = client.complete("hi", None).await.unwrap_err();
        assert_eq!(err.kind(), shopchat_types::error::FailureKind::Connectivity);
    }

    #[tokio::test]
    async fn test_fetch_history() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/chat/history")
            .match_query(Matcher::UrlEncoded("bot_id".into(), "5".into()))
            .with_status(200)
            .with_body(
                r#"{"data": [
                    {"id": 1, "user_message": "hỏi", "ai_response": "đáp",
                     "session_id": "s", "created_at": "2026-03-01T10:00:00Z"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client_for(&server, Some("tok"));
        let records = client.fetch_history().await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].ai_response.as_deref(), Some("đáp"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_history_error_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/chat/history")
            .match_query(Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let client = client_for(&server, None);
        let err = client.fetch_history().await.unwrap_err();
        assert!(matches!(err, HistoryError::Status(503)));
    }

    #[test]
    fn test_from_config_ignores_empty_token() {
        let config = AiConfig {
            token: Some(String::new()),
            ..AiConfig::default()
        };
        let client = AibanClient::from_config(&config);
        assert!(!client.has_token());
        assert_eq!(client.bot_id(), 5);
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let client = AibanClient::new("http://localhost:9000/api/v1/".to_string(), 5, None);
        assert_eq!(client.url("/chat"), "http://localhost:9000/api/v1/chat");
    }
}
