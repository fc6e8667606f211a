//! MessageStore trait definition.
//!
//! Persistence for conversation history, the offline outbox, and the list of
//! known conversations. Follows the same RPITIT pattern as the other ports.

use chatbot_types::chat::{ChatMessage, Conversation, ConversationId, NewChatMessage};
use chatbot_types::error::RepositoryError;
use chatbot_types::outbox::OutboxEntry;

/// Repository trait for chat history and the offline outbox.
///
/// Implementations live in chatbot-infra (e.g., `SqliteMessageStore`).
/// Implementations must tolerate interleaved calls from the send path and
/// the replay path.
pub trait MessageStore: Send + Sync {
    /// Append a message to its conversation, assigning it an id.
    fn append(
        &self,
        message: &NewChatMessage,
    ) -> impl std::future::Future<Output = Result<ChatMessage, RepositoryError>> + Send;

    /// All messages of a conversation, in the order they were appended.
    fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, RepositoryError>> + Send;

    /// Put a user utterance at the back of the outbox.
    fn enqueue_offline(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> impl std::future::Future<Output = Result<OutboxEntry, RepositoryError>> + Send;

    /// All outbox entries, oldest first.
    fn list_offline(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<OutboxEntry>, RepositoryError>> + Send;

    /// Remove every outbox entry, returning how many were removed.
    fn clear_offline(&self) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Remove a single outbox entry.
    ///
    /// Returns `RepositoryError::NotFound` if no such entry is queued.
    fn remove_offline(
        &self,
        entry_id: i64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Take exclusive hold of an outbox entry before sending it.
    ///
    /// Returns `false` if the entry is gone or another replay pass, in this
    /// process or another one sharing the store, already holds it. A hold
    /// that is never completed or released lapses after an
    /// implementation-defined lease.
    fn claim_offline(
        &self,
        entry_id: i64,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Give up a hold taken with `claim_offline`, leaving the entry queued.
    fn release_offline(
        &self,
        entry_id: i64,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Record a successful replay of an outbox entry.
    ///
    /// Appends `user` then `reply` and removes the entry as one atomic unit.
    /// If the entry is no longer queued, nothing is written and
    /// `RepositoryError::NotFound` is returned.
    fn complete_offline(
        &self,
        entry_id: i64,
        user: &NewChatMessage,
        reply: &NewChatMessage,
    ) -> impl std::future::Future<Output = Result<(ChatMessage, ChatMessage), RepositoryError>> + Send;

    /// Register a conversation id in the conversation list if it is not there yet.
    fn ensure_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Start a new conversation with the next free id.
    fn create_conversation(
        &self,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Known conversations, most recently created first.
    fn list_conversations(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Conversation>, RepositoryError>> + Send;
}
