//! Application state wiring the chat session together.
//!
//! `ChatSession` is generic over its store, client and connectivity oracle;
//! AppState pins it to the concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use chatbot_core::chat::session::ChatSession;
use chatbot_infra::chat::client::HttpChatClient;
use chatbot_infra::chat::connectivity::{Connectivity, ManualOracle, TcpProbeOracle};
use chatbot_infra::config::{load_config, resolve_api_key};
use chatbot_infra::filesystem::{ensure_data_dir, resolve_data_dir};
use chatbot_infra::sqlite::pool::DatabasePool;
use chatbot_infra::sqlite::store::SqliteMessageStore;
use chatbot_types::chat::ConversationId;
use chatbot_types::config::ChatConfig;

/// The session type pinned to the infra implementations.
pub type ConcreteChatSession = ChatSession<SqliteMessageStore, HttpChatClient, Connectivity>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<ConcreteChatSession>,
    pub config: Arc<ChatConfig>,
    pub data_dir: PathBuf,
}

/// Startup options taken from global CLI flags.
#[derive(Debug, Default, Clone, Copy)]
pub struct StartupOptions {
    /// Treat the network as unreachable regardless of the probe.
    pub force_offline: bool,
    /// Conversation to bind the session to.
    pub conversation: Option<ConversationId>,
}

impl AppState {
    /// Initialize the application state: load config, open the DB, wire the session.
    pub async fn init(options: StartupOptions) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        ensure_data_dir(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;

        let db_pool = DatabasePool::open(&data_dir)
            .await
            .context("Failed to open chat database")?;
        let store = SqliteMessageStore::new(db_pool);

        let conversation_id = match options.conversation {
            Some(id) => id,
            None => current_conversation(&store).await?,
        };

        let api_key = resolve_api_key(&config.api);
        if api_key.is_none() {
            warn!("No chat service API key configured; sends will fail until CHATBOT_API_KEY is set");
        }
        let client = HttpChatClient::new(&config.api, api_key)?;

        let oracle = if options.force_offline {
            Connectivity::Manual(ManualOracle::new(false))
        } else {
            Connectivity::Probe(TcpProbeOracle::from_config(&config.connectivity))
        };

        info!(%conversation_id, data_dir = %data_dir.display(), "Chat session ready");

        let session = ChatSession::new(
            store,
            client,
            oracle,
            conversation_id,
            config.notices.clone(),
        );

        Ok(Self {
            session: Arc::new(session),
            config: Arc::new(config),
            data_dir,
        })
    }
}

/// The conversation last started with `conversations new`, or conversation 1.
async fn current_conversation(store: &SqliteMessageStore) -> anyhow::Result<ConversationId> {
    let current = store
        .current_conversation()
        .await
        .context("Failed to read current conversation")?;

    Ok(current.unwrap_or(ConversationId(1)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbot_core::chat::store::MessageStore;

    async fn test_store() -> (tempfile::TempDir, SqliteMessageStore) {
        let dir = tempfile::tempdir().unwrap();
        let pool = DatabasePool::open(dir.path()).await.unwrap();
        (dir, SqliteMessageStore::new(pool))
    }

    #[tokio::test]
    async fn test_current_conversation_defaults_to_one() {
        let (_dir, store) = test_store().await;
        assert_eq!(current_conversation(&store).await.unwrap(), ConversationId(1));
    }

    #[tokio::test]
    async fn test_current_conversation_is_latest_created() {
        let (_dir, store) = test_store().await;
        store.create_conversation().await.unwrap();
        let latest = store.create_conversation().await.unwrap();

        assert_eq!(current_conversation(&store).await.unwrap(), latest.id);
    }

    #[tokio::test]
    async fn test_explicit_conversation_does_not_become_default() {
        let (_dir, store) = test_store().await;
        // What `chatbot -c 9 send ...` leaves behind
        store.ensure_conversation(ConversationId(9)).await.unwrap();
        store
            .append(&chatbot_types::chat::NewChatMessage::user(ConversationId(9), "hi"))
            .await
            .unwrap();

        assert_eq!(current_conversation(&store).await.unwrap(), ConversationId(1));
    }
}
