//! Conversation and message types for the chat client.
//!
//! A conversation is identified by a small integer chosen once and reused
//! until the user starts a new one. Messages within a conversation are
//! append-only and ordered by the sequence in which the store received them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Stable identifier of a conversation.
///
/// Also sent to the remote chat service as the external conversation key,
/// so the bot keeps context across turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(pub i64);

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(ConversationId)
            .map_err(|_| format!("invalid conversation id: '{s}'"))
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Bot,
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Author::User => write!(f, "user"),
            Author::Bot => write!(f, "bot"),
        }
    }
}

impl FromStr for Author {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Author::User),
            "bot" => Ok(Author::Bot),
            other => Err(format!("invalid author: '{other}'")),
        }
    }
}

/// A message as persisted in conversation history.
///
/// The `id` is assigned by the store on append and carries no meaning
/// beyond identity. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub conversation_id: ConversationId,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// A message that has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewChatMessage {
    pub conversation_id: ConversationId,
    pub author: Author,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl NewChatMessage {
    /// A user-authored message stamped with the current time.
    pub fn user(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self::now(conversation_id, Author::User, text)
    }

    /// A bot-authored message stamped with the current time.
    pub fn bot(conversation_id: ConversationId, text: impl Into<String>) -> Self {
        Self::now(conversation_id, Author::Bot, text)
    }

    fn now(conversation_id: ConversationId, author: Author, text: impl Into<String>) -> Self {
        Self {
            conversation_id,
            author,
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Attach a store-assigned id, producing the persisted form.
    pub fn with_id(self, id: Uuid) -> ChatMessage {
        ChatMessage {
            id,
            conversation_id: self.conversation_id,
            author: self.author,
            text: self.text,
            created_at: self.created_at,
        }
    }
}

/// An entry in the list of known conversations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub created_at: DateTime<Utc>,
}

/// The bot's answer to a single user utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotReply {
    pub bot_name: String,
    pub bot_id: i64,
    pub text: String,
    /// Mood tag reported by the service (e.g. "normal").
    pub emotion: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_author_roundtrip() {
        for author in [Author::User, Author::Bot] {
            let s = author.to_string();
            let parsed: Author = s.parse().unwrap();
            assert_eq!(author, parsed);
        }
    }

    #[test]
    fn test_author_rejects_unknown() {
        let err = "assistant".parse::<Author>().unwrap_err();
        assert!(err.contains("assistant"));
    }

    #[test]
    fn test_author_serde() {
        let json = serde_json::to_string(&Author::Bot).unwrap();
        assert_eq!(json, "\"bot\"");
    }

    #[test]
    fn test_conversation_id_parse() {
        assert_eq!(" 42 ".parse::<ConversationId>().unwrap(), ConversationId(42));
        assert!("forty-two".parse::<ConversationId>().is_err());
    }

    #[test]
    fn test_conversation_id_is_transparent_in_json() {
        let json = serde_json::to_string(&ConversationId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_new_message_with_id_keeps_fields() {
        let draft = NewChatMessage::user(ConversationId(3), "hello");
        let created_at = draft.created_at;
        let id = Uuid::now_v7();

        let stored = draft.with_id(id);
        assert_eq!(stored.id, id);
        assert_eq!(stored.conversation_id, ConversationId(3));
        assert_eq!(stored.author, Author::User);
        assert_eq!(stored.text, "hello");
        assert_eq!(stored.created_at, created_at);
    }
}
