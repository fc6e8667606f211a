//! Configuration loader for the chat client.
//!
//! Reads `config.toml` from the data directory (`~/.chatbot/` in production)
//! and deserializes it into [`ChatConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::Path;

use chatbot_types::config::{ApiConfig, ChatConfig};
use secrecy::SecretString;

/// Environment variable that takes precedence over `api.api_key`.
pub const API_KEY_ENV: &str = "CHATBOT_API_KEY";

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`ChatConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> ChatConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return ChatConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return ChatConfig::default();
        }
    };

    match toml::from_str::<ChatConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            ChatConfig::default()
        }
    }
}

/// Resolve the chat service API key.
///
/// Priority:
/// 1. `CHATBOT_API_KEY` environment variable
/// 2. `api.api_key` from `config.toml`
///
/// Blank values count as unset.
pub fn resolve_api_key(config: &ApiConfig) -> Option<SecretString> {
    pick_api_key(std::env::var(API_KEY_ENV).ok(), config.api_key.as_deref())
}

fn pick_api_key(from_env: Option<String>, from_config: Option<&str>) -> Option<SecretString> {
    from_env
        .filter(|key| !key.trim().is_empty())
        .or_else(|| {
            from_config
                .filter(|key| !key.trim().is_empty())
                .map(str::to_string)
        })
        .map(SecretString::from)
}
