//! Infrastructure layer for the chat client.
//!
//! Contains implementations of the port traits defined in `chatbot-core`:
//! SQLite message storage, the HTTP chat service client, connectivity
//! oracles, plus configuration loading and data directory resolution.

pub mod chat;
pub mod config;
pub mod filesystem;
pub mod sqlite;
