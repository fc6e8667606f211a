//! ChatClient and ConnectivityOracle trait definitions.
//!
//! These are the two outward-facing ports of a chat session: the remote
//! chat service and the reachability check consulted before every send.

use chatbot_types::chat::{BotReply, ConversationId};
use chatbot_types::error::ChatClientError;

/// Sends one user utterance to the remote chat service.
///
/// Implementations live in chatbot-infra (e.g., `HttpChatClient`).
pub trait ChatClient: Send + Sync {
    /// Send `text` within `conversation_id` and wait for the bot's answer.
    fn send(
        &self,
        text: &str,
        conversation_id: ConversationId,
    ) -> impl std::future::Future<Output = Result<BotReply, ChatClientError>> + Send;
}

/// Point-in-time network reachability check.
///
/// There is no change notification; callers ask again before every send.
pub trait ConnectivityOracle: Send + Sync {
    fn is_online(&self) -> bool;
}
