//! Chat service adapters: the HTTP client and connectivity oracles.

pub mod client;
pub mod connectivity;
pub mod types;
