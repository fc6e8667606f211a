//! Offline outbox entries.
//!
//! An entry is a user utterance that could not be sent when it was typed.
//! Entries are replayed strictly in the order they were enqueued.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::chat::ConversationId;

/// A queued, not-yet-sent user utterance.
///
/// `id` is the store's monotonic enqueue sequence; ordering by `id`
/// is the FIFO order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEntry {
    pub id: i64,
    pub conversation_id: ConversationId,
    pub text: String,
    pub enqueued_at: DateTime<Utc>,
}
