//! Chat session logic and port trait definitions.
//!
//! This crate defines the "ports" (store, client and connectivity traits) that
//! the infrastructure layer implements. It depends only on `chatbot-types` --
//! never on `chatbot-infra` or any database/IO crate.

pub mod chat;
