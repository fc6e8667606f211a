//! Chat session and message persistence abstractions.
//!
//! This module defines the `MessageStore`, `ChatClient` and
//! `ConnectivityOracle` ports that the infrastructure layer implements, and
//! the `ChatSession` that drives them.

pub mod client;
pub mod session;
pub mod store;
