//! Interactive chat: a readline loop over the current conversation.
//!
//! Entry point: `loop_runner::run_chat_loop`.

pub mod commands;
pub mod input;
pub mod loop_runner;
