//! Chat session orchestrating send-or-queue decisions and outbox replay.
//!
//! A `ChatSession` is bound to one conversation. `submit` sends a user
//! utterance when the network is reachable and parks it in the outbox when it
//! is not. `replay_if_online` drains the outbox, oldest entry first, one full
//! round trip at a time, stopping at the first failure.

use chatbot_types::chat::{ChatMessage, ConversationId, NewChatMessage};
use chatbot_types::config::NoticeConfig;
use chatbot_types::error::{RepositoryError, SessionError};
use chatbot_types::outbox::OutboxEntry;
use chatbot_types::session::{ReplayFailure, ReplayReport, ReplayStop, SubmitOutcome};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::chat::client::{ChatClient, ConnectivityOracle};
use crate::chat::store::MessageStore;

/// Orchestrates one conversation against a store, a chat client, and a
/// connectivity oracle.
///
/// Generic over the three ports so that chatbot-core never depends on
/// chatbot-infra.
pub struct ChatSession<S: MessageStore, C: ChatClient, O: ConnectivityOracle> {
    store: S,
    client: C,
    oracle: O,
    conversation_id: ConversationId,
    notices: NoticeConfig,
    /// Held for the duration of a replay pass so two passes never overlap.
    replay_lock: Mutex<()>,
}

impl<S: MessageStore, C: ChatClient, O: ConnectivityOracle> ChatSession<S, C, O> {
    /// Create a session for `conversation_id`.
    pub fn new(
        store: S,
        client: C,
        oracle: O,
        conversation_id: ConversationId,
        notices: NoticeConfig,
    ) -> Self {
        Self {
            store,
            client,
            oracle,
            conversation_id,
            notices,
            replay_lock: Mutex::new(()),
        }
    }

    pub fn conversation_id(&self) -> ConversationId {
        self.conversation_id
    }

    /// Access the message store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current reachability as reported by the oracle.
    pub fn is_online(&self) -> bool {
        self.oracle.is_online()
    }

    /// Prepare the conversation for use.
    ///
    /// Registers the conversation and, if it has no history yet, writes the
    /// greeting notice. Returns whether the greeting was written.
    pub async fn start(&self) -> Result<bool, SessionError> {
        self.store.ensure_conversation(self.conversation_id).await?;

        let history = self.store.list_messages(self.conversation_id).await?;
        if !history.is_empty() {
            return Ok(false);
        }

        self.store
            .append(&NewChatMessage::bot(
                self.conversation_id,
                self.notices.greeting.as_str(),
            ))
            .await?;
        debug!(conversation_id = %self.conversation_id, "Greeting written to new conversation");
        Ok(true)
    }

    /// Send a user utterance, or queue it if the network is unreachable.
    ///
    /// Blank input is rejected before anything is written. Send failures are
    /// reported as `SubmitOutcome::Failed`; the user message is kept.
    pub async fn submit(&self, text: &str) -> Result<SubmitOutcome, SessionError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(SessionError::Validation(
                "message text must not be empty".to_string(),
            ));
        }

        if !self.oracle.is_online() {
            let entry = self.queue_offline(text).await?;
            return Ok(SubmitOutcome::QueuedOffline { entry });
        }

        self.store
            .append(&NewChatMessage::user(self.conversation_id, text))
            .await?;

        match self.client.send(text, self.conversation_id).await {
            Ok(reply) => {
                self.store
                    .append(&NewChatMessage::bot(self.conversation_id, reply.text.as_str()))
                    .await?;
                info!(
                    conversation_id = %self.conversation_id,
                    bot = %reply.bot_name,
                    "Reply delivered"
                );
                Ok(SubmitOutcome::Delivered { reply })
            }
            Err(cause) => {
                warn!(conversation_id = %self.conversation_id, error = %cause, "Send failed");
                Ok(SubmitOutcome::Failed { cause })
            }
        }
    }

    async fn queue_offline(&self, text: &str) -> Result<OutboxEntry, SessionError> {
        self.store
            .append(&NewChatMessage::bot(
                self.conversation_id,
                self.notices.offline_reply.as_str(),
            ))
            .await?;
        let entry = self
            .store
            .enqueue_offline(self.conversation_id, text)
            .await?;
        self.store
            .append(&NewChatMessage::bot(
                self.conversation_id,
                self.notices.offline_saved.as_str(),
            ))
            .await?;

        info!(
            conversation_id = %self.conversation_id,
            entry_id = entry.id,
            "Offline, message queued"
        );
        Ok(entry)
    }

    /// Drain the offline outbox if the network is reachable.
    ///
    /// Entries are sent oldest first, each one awaited to completion before
    /// the next starts. An entry leaves the outbox only together with its
    /// stored user message and bot reply. The pass stops at the first failed
    /// send or when connectivity drops between entries; whatever is left
    /// stays queued for the next pass.
    ///
    /// Each entry is claimed in the store before it is sent, so passes in
    /// other processes sharing the store never send it a second time. Meeting
    /// an entry held elsewhere ends the pass with `ReplayStop::Claimed`.
    ///
    /// Entries are replayed into the conversation they were composed in,
    /// which may differ from this session's conversation.
    pub async fn replay_if_online(&self) -> Result<ReplayReport, SessionError> {
        let _pass = self.replay_lock.lock().await;
        let mut report = ReplayReport::default();

        if !self.oracle.is_online() {
            debug!("Offline, skipping outbox replay");
            return Ok(report);
        }

        let entries = self.store.list_offline().await?;
        if entries.is_empty() {
            return Ok(report);
        }
        info!(queued = entries.len(), "Replaying offline outbox");

        for (index, entry) in entries.into_iter().enumerate() {
            if index > 0 && !self.oracle.is_online() {
                warn!(entry_id = entry.id, "Connectivity lost, replay paused");
                report.failure = Some(ReplayFailure {
                    failed_at: index,
                    entry_id: entry.id,
                    cause: ReplayStop::Offline,
                });
                break;
            }

            if !self.store.claim_offline(entry.id).await? {
                info!(entry_id = entry.id, "Outbox entry held by another replay, stopping");
                report.failure = Some(ReplayFailure {
                    failed_at: index,
                    entry_id: entry.id,
                    cause: ReplayStop::Claimed,
                });
                break;
            }

            report.attempted += 1;
            let user = NewChatMessage::user(entry.conversation_id, entry.text.as_str());

            match self.client.send(&entry.text, entry.conversation_id).await {
                Ok(reply) => {
                    let bot = NewChatMessage::bot(entry.conversation_id, reply.text);
                    match self.store.complete_offline(entry.id, &user, &bot).await {
                        Ok(_) => {
                            report.replayed += 1;
                            debug!(
                                entry_id = entry.id,
                                conversation_id = %entry.conversation_id,
                                "Outbox entry replayed"
                            );
                        }
                        // Our hold lapsed and another pass finished the entry first.
                        Err(RepositoryError::NotFound) => {
                            warn!(entry_id = entry.id, "Outbox entry already replayed elsewhere");
                            report.failure = Some(ReplayFailure {
                                failed_at: index,
                                entry_id: entry.id,
                                cause: ReplayStop::Claimed,
                            });
                            break;
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
                Err(cause) => {
                    warn!(entry_id = entry.id, error = %cause, "Replay send failed");
                    self.store.release_offline(entry.id).await?;
                    report.failure = Some(ReplayFailure {
                        failed_at: index,
                        entry_id: entry.id,
                        cause: ReplayStop::Client(cause),
                    });
                    break;
                }
            }
        }

        info!(
            attempted = report.attempted,
            replayed = report.replayed,
            complete = report.is_complete(),
            "Replay pass finished"
        );
        Ok(report)
    }

    /// History of this session's conversation.
    pub async fn history(&self) -> Result<Vec<ChatMessage>, SessionError> {
        Ok(self.store.list_messages(self.conversation_id).await?)
    }

    /// Everything still waiting in the outbox, oldest first.
    pub async fn outbox(&self) -> Result<Vec<OutboxEntry>, SessionError> {
        Ok(self.store.list_offline().await?)
    }
}
