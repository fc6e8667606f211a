//! SQLite message store implementation.
//!
//! Implements `MessageStore` from `chatbot-core` using sqlx with split
//! read/write pools: raw queries, private Row structs, reads on the reader
//! pool, and every write on the single-connection writer pool.

use chatbot_core::chat::store::MessageStore;
use chatbot_types::chat::{Author, ChatMessage, Conversation, ConversationId, NewChatMessage};
use chatbot_types::error::RepositoryError;
use chatbot_types::outbox::OutboxEntry;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::{Row, SqliteConnection};
use tracing::debug;
use uuid::Uuid;

use super::pool::DatabasePool;

/// How long an outbox claim holds before another pass may take the entry.
///
/// Comfortably longer than a chat service request, so only a pass that died
/// mid-send leaves an entry to lapse.
pub const DEFAULT_CLAIM_LEASE: Duration = Duration::from_secs(5 * 60);

const CURRENT_CONVERSATION_KEY: &str = "current_conversation";

/// SQLite-backed implementation of `MessageStore`.
pub struct SqliteMessageStore {
    pool: DatabasePool,
    claim_lease: Duration,
}

impl SqliteMessageStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            pool,
            claim_lease: DEFAULT_CLAIM_LEASE,
        }
    }

    /// Override how long outbox claims hold.
    pub fn with_claim_lease(mut self, lease: Duration) -> Self {
        self.claim_lease = lease;
        self
    }

    /// The conversation last started with `create_conversation`, if any.
    ///
    /// Conversations that only came into existence by being written to (for
    /// example through an explicit `--conversation`) never become current.
    pub async fn current_conversation(&self) -> Result<Option<ConversationId>, RepositoryError> {
        let value: Option<(String,)> = sqlx::query_as("SELECT value FROM settings WHERE key = ?")
            .bind(CURRENT_CONVERSATION_KEY)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        value
            .map(|(v,)| {
                v.parse::<i64>()
                    .map(ConversationId)
                    .map_err(|e| RepositoryError::Query(format!("invalid current conversation: {e}")))
            })
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ChatMessageRow {
    id: String,
    conversation_id: i64,
    author: String,
    text: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            author: row.try_get("author")?,
            text: row.try_get("text")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid message id: {e}")))?;
        let author: Author = self
            .author
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(ChatMessage {
            id,
            conversation_id: ConversationId(self.conversation_id),
            author,
            text: self.text,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct OutboxRow {
    seq: i64,
    conversation_id: i64,
    text: String,
    enqueued_at: String,
}

impl OutboxRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            seq: row.try_get("seq")?,
            conversation_id: row.try_get("conversation_id")?,
            text: row.try_get("text")?,
            enqueued_at: row.try_get("enqueued_at")?,
        })
    }

    fn into_entry(self) -> Result<OutboxEntry, RepositoryError> {
        Ok(OutboxEntry {
            id: self.seq,
            conversation_id: ConversationId(self.conversation_id),
            text: self.text,
            enqueued_at: parse_datetime(&self.enqueued_at)?,
        })
    }
}

fn conversation_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Conversation, RepositoryError> {
    let id: i64 = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(Conversation {
        id: ConversationId(id),
        created_at: parse_datetime(&created_at)?,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

async fn insert_conversation_if_missing(
    conn: &mut SqliteConnection,
    conversation_id: ConversationId,
) -> Result<(), RepositoryError> {
    sqlx::query("INSERT OR IGNORE INTO conversations (id, created_at) VALUES (?, ?)")
        .bind(conversation_id.0)
        .bind(format_datetime(&Utc::now()))
        .execute(&mut *conn)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    Ok(())
}

async fn insert_message(
    conn: &mut SqliteConnection,
    message: &NewChatMessage,
) -> Result<ChatMessage, RepositoryError> {
    let stored = message.clone().with_id(Uuid::now_v7());

    sqlx::query(
        r#"INSERT INTO chat_messages (id, conversation_id, author, text, created_at)
           VALUES (?, ?, ?, ?, ?)"#,
    )
    .bind(stored.id.to_string())
    .bind(stored.conversation_id.0)
    .bind(stored.author.to_string())
    .bind(&stored.text)
    .bind(format_datetime(&stored.created_at))
    .execute(&mut *conn)
    .await
    .map_err(|e| RepositoryError::Query(e.to_string()))?;

    Ok(stored)
}

// ---------------------------------------------------------------------------
// MessageStore implementation
// ---------------------------------------------------------------------------

impl MessageStore for SqliteMessageStore {
    async fn append(&self, message: &NewChatMessage) -> Result<ChatMessage, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        insert_conversation_if_missing(&mut tx, message.conversation_id).await?;
        let stored = insert_message(&mut tx, message).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(stored)
    }

    async fn list_messages(
        &self,
        conversation_id: ConversationId,
    ) -> Result<Vec<ChatMessage>, RepositoryError> {
        let rows =
            sqlx::query("SELECT * FROM chat_messages WHERE conversation_id = ? ORDER BY seq ASC")
                .bind(conversation_id.0)
                .fetch_all(&self.pool.reader)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut messages = Vec::with_capacity(rows.len());
        for row in &rows {
            let msg_row = ChatMessageRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            messages.push(msg_row.into_message()?);
        }

        Ok(messages)
    }

    async fn enqueue_offline(
        &self,
        conversation_id: ConversationId,
        text: &str,
    ) -> Result<OutboxEntry, RepositoryError> {
        let enqueued_at = Utc::now();

        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        insert_conversation_if_missing(&mut tx, conversation_id).await?;

        let result =
            sqlx::query("INSERT INTO outbox (conversation_id, text, enqueued_at) VALUES (?, ?, ?)")
                .bind(conversation_id.0)
                .bind(text)
                .bind(format_datetime(&enqueued_at))
                .execute(&mut *tx)
                .await
                .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(OutboxEntry {
            id: result.last_insert_rowid(),
            conversation_id,
            text: text.to_string(),
            enqueued_at,
        })
    }

    async fn list_offline(&self) -> Result<Vec<OutboxEntry>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM outbox ORDER BY seq ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in &rows {
            let outbox_row =
                OutboxRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            entries.push(outbox_row.into_entry()?);
        }

        Ok(entries)
    }

    async fn clear_offline(&self) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM outbox")
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn remove_offline(&self, entry_id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM outbox WHERE seq = ?")
            .bind(entry_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn claim_offline(&self, entry_id: i64) -> Result<bool, RepositoryError> {
        let now = Utc::now().timestamp_millis();
        let lease = i64::try_from(self.claim_lease.as_millis()).unwrap_or(i64::MAX);

        let result = sqlx::query(
            r#"UPDATE outbox SET claimed_at = ?
               WHERE seq = ? AND (claimed_at IS NULL OR claimed_at <= ?)"#,
        )
        .bind(now)
        .bind(entry_id)
        .bind(now.saturating_sub(lease))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let claimed = result.rows_affected() == 1;
        debug!(entry_id, claimed, "Outbox claim");
        Ok(claimed)
    }

    async fn release_offline(&self, entry_id: i64) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE outbox SET claimed_at = NULL WHERE seq = ?")
            .bind(entry_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(())
    }

    async fn complete_offline(
        &self,
        entry_id: i64,
        user: &NewChatMessage,
        reply: &NewChatMessage,
    ) -> Result<(ChatMessage, ChatMessage), RepositoryError> {
        // Delete first: if the entry is gone the transaction is dropped and
        // rolled back before anything is appended.
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let deleted = sqlx::query("DELETE FROM outbox WHERE seq = ?")
            .bind(entry_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if deleted.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        insert_conversation_if_missing(&mut tx, user.conversation_id).await?;
        let user = insert_message(&mut tx, user).await?;
        let reply = insert_message(&mut tx, reply).await?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok((user, reply))
    }

    async fn ensure_conversation(
        &self,
        conversation_id: ConversationId,
    ) -> Result<(), RepositoryError> {
        let mut conn = self
            .pool
            .writer
            .acquire()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        insert_conversation_if_missing(&mut conn, conversation_id).await
    }

    /// Also makes the new conversation the current one.
    async fn create_conversation(&self) -> Result<Conversation, RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let row = sqlx::query(
            r#"INSERT INTO conversations (id, created_at)
               VALUES ((SELECT COALESCE(MAX(id), 0) + 1 FROM conversations), ?)
               RETURNING id, created_at"#,
        )
        .bind(format_datetime(&Utc::now()))
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
        let conversation = conversation_from_row(&row)?;

        sqlx::query(
            r#"INSERT INTO settings (key, value) VALUES (?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value"#,
        )
        .bind(CURRENT_CONVERSATION_KEY)
        .bind(conversation.id.0.to_string())
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(conversation)
    }

    async fn list_conversations(&self) -> Result<Vec<Conversation>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM conversations ORDER BY created_at DESC, id DESC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(conversation_from_row).collect()
    }
}
