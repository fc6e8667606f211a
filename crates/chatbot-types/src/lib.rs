//! Shared domain types for the chat client.
//!
//! Conversations, messages, the offline outbox, results of send and replay
//! operations, configuration, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod chat;
pub mod config;
pub mod error;
pub mod outbox;
pub mod session;
