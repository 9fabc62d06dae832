//! Storefront backend adapter: persists finalized bot replies for members.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use shopchat_core::service::persistence::PersistenceService;
use shopchat_types::config::BackendConfig;
use shopchat_types::error::PersistenceError;
use shopchat_types::message::SaveBotMessage;

/// HTTP client for the storefront REST backend.
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<SecretString>,
}

impl BackendClient {
    pub fn new(base_url: String, auth_token: Option<SecretString>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("failed to create reqwest client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
        }
    }

    pub fn from_config(config: &BackendConfig) -> Self {
        let token = config
            .auth_token
            .as_ref()
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.clone()));
        Self::new(config.base_url.clone(), token)
    }

    fn bot_messages_url(&self, conversation_id: i64) -> String {
        format!(
            "{}/chat/conversations/{conversation_id}/bot-messages",
            self.base_url
        )
    }
}

impl PersistenceService for BackendClient {
    async fn save_bot_message(&self, payload: &SaveBotMessage) -> Result<(), PersistenceError> {
        let mut request = self
            .client
            .post(self.bot_messages_url(payload.conversation_id))
            .json(payload);
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| PersistenceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PersistenceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(
            conversation_id = payload.conversation_id,
            "Bot message persisted"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn payload() -> SaveBotMessage {
        SaveBotMessage {
            conversation_id: 42,
            message: "Đơn hàng của bạn đang được giao".to_string(),
            session_id: Some("sess-m".to_string()),
        }
    }

    #[tokio::test]
    async fn test_save_posts_camel_case_payload() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/conversations/42/bot-messages")
            .match_header("authorization", "Bearer member-jwt")
            .match_body(Matcher::Json(serde_json::json!({
                "conversationId": 42,
                "message": "Đơn hàng của bạn đang được giao",
                "sessionId": "sess-m"
            })))
            .with_status(201)
            .create_async()
            .await;

        let client = BackendClient::new(
            server.url(),
            Some(SecretString::from("member-jwt".to_string())),
        );
        client.save_bot_message(&payload()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_save_without_token_sends_no_auth_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/conversations/42/bot-messages")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .create_async()
            .await;

        let client = BackendClient::new(server.url(), None);
        client.save_bot_message(&payload()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_save_rejected() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/chat/conversations/42/bot-messages")
            .with_status(404)
            .with_body("conversation not found")
            .create_async()
            .await;

        let client = BackendClient::new(server.url(), None);
        let err = client.save_bot_message(&payload()).await.unwrap_err();

        assert!(matches!(
            err,
            PersistenceError::Status { status: 404, ref body } if body == "conversation not found"
        ));
    }

    #[tokio::test]
    async fn test_save_unreachable() {
        let client = BackendClient::new("http://127.0.0.1:1".to_string(), None);
        let err = client.save_bot_message(&payload()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::Network(_)));
    }
}
