//! Configuration types for the chat widget backend.
//!
//! `ShopChatConfig` represents the top-level `config.toml`. Every field has
//! a default so an empty or missing file yields a working configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Loaded from `~/.shopchat/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopChatConfig {
    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub exchange: ExchangeConfig,
}

/// The third-party chat completion API (aiban.vn).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,

    /// Bot configured on the provider side for this storefront.
    #[serde(default = "default_bot_id")]
    pub bot_id: i64,

    /// Bearer token. Usually supplied through the environment instead.
    #[serde(default)]
    pub token: Option<String>,
}

fn default_ai_base_url() -> String {
    "https://api.aiban.vn/api/v1".to_string()
}

fn default_bot_id() -> i64 {
    5
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            bot_id: default_bot_id(),
            token: None,
        }
    }
}

/// The storefront REST backend that persists bot replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,

    /// Bearer token of the signed-in member, if any.
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_backend_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_backend_base_url(),
            auth_token: None,
        }
    }
}

/// Timing and capacity knobs of a chat exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExchangeConfig {
    /// Pause between showing the placeholder and calling the provider.
    #[serde(default = "default_pacing_delay_ms")]
    pub pacing_delay_ms: u64,

    /// How long a member exchange waits for its conversation to be created.
    #[serde(default = "default_conversation_wait_ms")]
    pub conversation_wait_ms: u64,

    /// Upper bound on a single completion call.
    #[serde(default = "default_completion_timeout_ms")]
    pub completion_timeout_ms: u64,

    /// Capacity of the per-chat event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_pacing_delay_ms() -> u64 {
    500
}

fn default_conversation_wait_ms() -> u64 {
    1_000
}

fn default_completion_timeout_ms() -> u64 {
    30_000
}

fn default_event_capacity() -> usize {
    256
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            pacing_delay_ms: default_pacing_delay_ms(),
            conversation_wait_ms: default_conversation_wait_ms(),
            completion_timeout_ms: default_completion_timeout_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl ExchangeConfig {
    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn conversation_wait(&self) -> Duration {
        Duration::from_millis(self.conversation_wait_ms)
    }

    pub fn completion_timeout(&self) -> Duration {
        Duration::from_millis(self.completion_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = ShopChatConfig::default();
        assert_eq!(config.ai.bot_id, 5);
        assert_eq!(config.ai.base_url, "https://api.aiban.vn/api/v1");
        assert!(config.ai.token.is_none());
        assert_eq!(config.exchange.pacing_delay(), Duration::from_millis(500));
        assert_eq!(config.exchange.conversation_wait(), Duration::from_secs(1));
        assert_eq!(config.exchange.completion_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: ShopChatConfig = toml::from_str("").unwrap();
        assert_eq!(config.ai.bot_id, 5);
        assert_eq!(config.exchange.event_capacity, 256);
        assert_eq!(config.backend.base_url, "http://localhost:8080/api");
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let toml_str = r#"
[ai]
bot_id = 9
token = "tok"

[exchange]
pacing_delay_ms = 0
completion_timeout_ms = 5000
"#;
        let config: ShopChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.ai.bot_id, 9);
        assert_eq!(config.ai.token.as_deref(), Some("tok"));
        assert_eq!(config.ai.base_url, "https://api.aiban.vn/api/v1");
        assert_eq!(config.exchange.pacing_delay(), Duration::ZERO);
        assert_eq!(config.exchange.completion_timeout(), Duration::from_secs(5));
        assert_eq!(config.exchange.conversation_wait_ms, 1_000);
    }
}
