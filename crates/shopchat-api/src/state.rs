//! Application state wiring all services together.
//!
//! AppState holds the concrete adapters used by both the CLI and the REST
//! API. Chat instances are keyed by session id and created on first use;
//! each owns its own message list, typing flag, conversation slot and
//! busy gate.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;

use shopchat_core::chat::exchange::{ChatExchange, ChatIdentity, ExchangeOutcome};
use shopchat_core::service::history::HistoryLoader;
use shopchat_infra::aiban::AibanClient;
use shopchat_infra::backend::BackendClient;
use shopchat_infra::config::{load_config, resolve_data_dir};
use shopchat_types::config::ShopChatConfig;
use shopchat_types::error::ExchangeError;

/// Exchange pinned to the HTTP adapters.
pub type ConcreteExchange = ChatExchange<AibanClient, BackendClient>;

pub type ConcreteHistoryLoader = HistoryLoader<AibanClient>;

/// One chat widget instance: the exchange plus its history loader.
pub struct ChatInstance {
    pub session_id: String,
    pub exchange: ConcreteExchange,
    pub history: ConcreteHistoryLoader,
}

impl ChatInstance {
    /// Run one exchange. An answered exchange also refreshes the history
    /// snapshot in the background.
    pub async fn send(
        &self,
        text: &str,
        conversation_id: Option<i64>,
    ) -> Result<ExchangeOutcome, ExchangeError> {
        let outcome = self.exchange.send_message(text, conversation_id).await?;
        if matches!(outcome, ExchangeOutcome::Answered(_)) {
            self.history.refresh_in_background();
        }
        Ok(outcome)
    }

    /// Wait for background persistence and history refreshes.
    pub async fn flush(&self) {
        self.exchange.flush_background().await;
        self.history.flush_background().await;
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ShopChatConfig>,
    pub data_dir: PathBuf,
    pub ai_client: Arc<AibanClient>,
    pub backend_client: Arc<BackendClient>,
    chats: Arc<DashMap<String, Arc<ChatInstance>>>,
}

impl AppState {
    /// Resolve the data directory, load configuration, and wire adapters.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await;

        if config.ai.token.is_none() {
            tracing::warn!(
                "No completion API token configured; set SHOPCHAT_AI_TOKEN or [ai].token"
            );
        }

        Ok(Self::from_config(config, data_dir))
    }

    pub fn from_config(config: ShopChatConfig, data_dir: PathBuf) -> Self {
        let ai_client = Arc::new(AibanClient::from_config(&config.ai));
        let backend_client = Arc::new(BackendClient::from_config(&config.backend));

        Self {
            config: Arc::new(config),
            data_dir,
            ai_client,
            backend_client,
            chats: Arc::new(DashMap::new()),
        }
    }

    /// Get the chat instance for `session_id`, creating it if needed.
    ///
    /// `is_guest` only applies on creation; an existing instance keeps the
    /// identity it was created with.
    pub fn chat(&self, session_id: &str, is_guest: bool) -> Arc<ChatInstance> {
        self.chats
            .entry(session_id.to_string())
            .or_insert_with(|| {
                tracing::debug!(session_id, is_guest, "Creating chat instance");
                Arc::new(self.build_instance(session_id, is_guest))
            })
            .clone()
    }

    /// Get an existing chat instance.
    pub fn existing_chat(&self, session_id: &str) -> Option<Arc<ChatInstance>> {
        self.chats.get(session_id).map(|entry| entry.value().clone())
    }

    /// Build a standalone chat instance that is not registered in the map.
    pub fn build_instance(&self, session_id: &str, is_guest: bool) -> ChatInstance {
        let session = Some(session_id.to_string());
        let identity = if is_guest {
            ChatIdentity::guest(session)
        } else {
            ChatIdentity::member(session)
        };

        ChatInstance {
            session_id: session_id.to_string(),
            exchange: ChatExchange::new(
                self.ai_client.clone(),
                self.backend_client.clone(),
                identity,
                self.config.exchange.clone(),
            ),
            history: HistoryLoader::new(self.ai_client.clone()),
        }
    }

    /// Wait for outstanding background work in every chat.
    pub async fn flush_all(&self) {
        let instances: Vec<Arc<ChatInstance>> =
            self.chats.iter().map(|entry| entry.value().clone()).collect();
        for instance in instances {
            instance.flush().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};

    fn state() -> AppState {
        AppState::from_config(ShopChatConfig::default(), PathBuf::from("/tmp/shopchat-test"))
    }

    fn state_for(upstream: &ServerGuard) -> AppState {
        let mut config = ShopChatConfig::default();
        config.ai.base_url = upstream.url();
        config.ai.token = Some("tok".to_string());
        config.exchange.pacing_delay_ms = 0;
        AppState::from_config(config, PathBuf::from("/tmp/shopchat-test"))
    }

    async fn history_mock(upstream: &mut ServerGuard, hits: usize) -> mockito::Mock {
        upstream
            .mock("GET", "/chat/history")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"{"data": [{"id": 4, "user_message": "hỏi", "ai_response": "đáp",
                    "created_at": "2026-03-01T10:00:00Z"}]}"#,
            )
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_answered_send_refreshes_history_snapshot() {
        let mut upstream = Server::new_async().await;
        upstream
            .mock("POST", "/chat")
            .with_status(200)
            .with_body(r#"{"response": "Chào bạn"}"#)
            .create_async()
            .await;
        let history = history_mock(&mut upstream, 1).await;

        let state = state_for(&upstream);
        let chat = state.chat("s-refresh", true);
        assert!(chat.history.snapshot().is_empty());

        let outcome = chat.send("xin chào", None).await.unwrap();
        assert_eq!(outcome.label(), "answered");
        chat.flush().await;

        assert_eq!(chat.history.snapshot()[0].id, 4);
        assert_eq!(chat.exchange.store().len(), 1);
        history.assert_async().await;
    }

    #[tokio::test]
    async fn test_failed_send_skips_history_refresh() {
        let mut upstream = Server::new_async().await;
        upstream
            .mock("POST", "/chat")
            .with_status(500)
            .create_async()
            .await;
        let history = history_mock(&mut upstream, 0).await;

        let state = state_for(&upstream);
        let chat = state.chat("s-failed", true);
        let outcome = chat.send("xin chào", None).await.unwrap();
        assert_eq!(outcome.label(), "failed");
        state.flush_all().await;

        assert!(chat.history.snapshot().is_empty());
        history.assert_async().await;
    }

    #[test]
    fn test_chat_is_created_once_per_session() {
        let state = state();
        let a = state.chat("s1", true);
        let b = state.chat("s1", false);

        assert!(Arc::ptr_eq(&a, &b));
        assert!(b.exchange.identity().is_guest);
        assert_eq!(a.exchange.identity().session_id.as_deref(), Some("s1"));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let state = state();
        let guest = state.chat("g", true);
        let member = state.chat("m", false);

        assert!(!Arc::ptr_eq(&guest, &member));
        assert!(!member.exchange.identity().is_guest);
        assert!(state.existing_chat("unknown").is_none());
    }
}
