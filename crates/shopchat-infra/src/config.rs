//! Configuration loader for the chat widget backend.
//!
//! Reads `config.toml` from the data directory (`~/.shopchat/` in production)
//! and deserializes it into [`ShopChatConfig`]. Falls back to defaults when
//! the file is missing or malformed, then applies environment overrides.

use std::path::{Path, PathBuf};

use shopchat_types::config::ShopChatConfig;

/// Environment variable holding the completion API token.
pub const AI_TOKEN_ENV: &str = "SHOPCHAT_AI_TOKEN";

/// Token variable used by the storefront's own build, honoured as a fallback.
pub const PUBLIC_AI_TOKEN_ENV: &str = "NEXT_PUBLIC_AI_PUBLIC_TOKEN";

/// Environment variable overriding `[backend].base_url`.
pub const BACKEND_URL_ENV: &str = "SHOPCHAT_BACKEND_URL";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `SHOPCHAT_DATA_DIR` environment variable
/// 2. `~/.shopchat`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SHOPCHAT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".shopchat");
    }

    PathBuf::from(".shopchat")
}

/// Load configuration from `{data_dir}/config.toml` plus the process environment.
pub async fn load_config(data_dir: &Path) -> ShopChatConfig {
    let config = load_config_file(data_dir).await;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Load `{data_dir}/config.toml` without consulting the environment.
///
/// - If the file does not exist, returns [`ShopChatConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
pub async fn load_config_file(data_dir: &Path) -> ShopChatConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ShopChatConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ShopChatConfig::default();
        }
    };

    match toml::from_str::<ShopChatConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ShopChatConfig::default()
        }
    }
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Empty values are ignored. `SHOPCHAT_AI_TOKEN` wins over
/// `NEXT_PUBLIC_AI_PUBLIC_TOKEN`; either wins over the file.
pub fn apply_env_overrides<F>(mut config: ShopChatConfig, lookup: F) -> ShopChatConfig
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = non_empty(AI_TOKEN_ENV).or_else(|| non_empty(PUBLIC_AI_TOKEN_ENV)) {
        config.ai.token = Some(token);
    }

    if let Some(url) = non_empty(BACKEND_URL_ENV) {
        config.backend.base_url = url;
    }

    config
}
