//! Logging and trace export setup shared by the chat client binaries.

pub mod tracing_setup;
