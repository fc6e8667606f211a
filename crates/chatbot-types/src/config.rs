//! Client configuration types.
//!
//! `ChatConfig` represents the top-level `config.toml` that points the
//! client at a chat service, tells it how to probe connectivity, and holds
//! the canned bot notices shown around offline sends.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the chat client.
///
/// Loaded from `~/.chatbot/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub connectivity: ConnectivityConfig,

    #[serde(default)]
    pub notices: NoticeConfig,
}

/// Remote chat service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Endpoint receiving the `apiKey`, `chatBotID`, `message` and
    /// `externalID` query parameters.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key for the chat service. `CHATBOT_API_KEY` overrides it.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Which bot personality to talk to.
    #[serde(default = "default_bot_id")]
    pub bot_id: i64,

    /// Prefix for the per-conversation external id sent to the service.
    #[serde(default = "default_external_id_prefix")]
    pub external_id_prefix: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://www.personalityforge.com/api/chat/".to_string()
}

fn default_bot_id() -> i64 {
    63906
}

fn default_external_id_prefix() -> String {
    "chatbot".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            bot_id: default_bot_id(),
            external_id_prefix: default_external_id_prefix(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// How reachability is checked before each send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectivityConfig {
    /// `host:port` that must accept a TCP connection for the client to
    /// consider itself online.
    #[serde(default = "default_probe_addr")]
    pub probe_addr: String,

    #[serde(default = "default_probe_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_probe_addr() -> String {
    "www.personalityforge.com:443".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    1_500
}

impl Default for ConnectivityConfig {
    fn default() -> Self {
        Self {
            probe_addr: default_probe_addr(),
            timeout_ms: default_probe_timeout_ms(),
        }
    }
}

/// Canned bot messages written into history by the client itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoticeConfig {
    /// Opens every new conversation.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Written before an utterance is queued offline.
    #[serde(default = "default_offline_reply")]
    pub offline_reply: String,

    /// Written after an utterance is queued offline.
    #[serde(default = "default_offline_saved")]
    pub offline_saved: String,
}

fn default_greeting() -> String {
    "Hi there! What would you like to talk about?".to_string()
}

fn default_offline_reply() -> String {
    "Looks like you're offline right now.".to_string()
}

fn default_offline_saved() -> String {
    "I've saved your message and will send it once you're back online.".to_string()
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            offline_reply: default_offline_reply(),
            offline_saved: default_offline_saved(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_config_default_values() {
        let config = ChatConfig::default();
        assert_eq!(config.api.bot_id, 63906);
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.api.api_key.is_none());
        assert_eq!(config.connectivity.timeout_ms, 1_500);
        assert!(!config.notices.offline_saved.is_empty());
    }

    #[test]
    fn test_chat_config_deserialize_with_defaults() {
        let config: ChatConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, default_base_url());
        assert_eq!(config.connectivity.probe_addr, default_probe_addr());
        assert_eq!(config.notices, NoticeConfig::default());
    }

    #[test]
    fn test_chat_config_deserialize_partial_sections() {
        let toml_str = r#"
[api]
base_url = "http://localhost:8080/chat"
bot_id = 12

[notices]
greeting = "Hello!"
"#;
        let config: ChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080/chat");
        assert_eq!(config.api.bot_id, 12);
        // Unset fields in a present section still get their defaults
        assert_eq!(config.api.timeout_secs, 30);
        assert_eq!(config.notices.greeting, "Hello!");
        assert_eq!(config.notices.offline_reply, default_offline_reply());
        assert_eq!(config.connectivity.timeout_ms, 1_500);
    }
}
