//! CLI command definitions for the `chatbot` binary.
//!
//! Uses clap derive macros for argument parsing. Global flags choose the
//! output format, log verbosity, connectivity override and conversation.

pub mod chat;
pub mod conversation;
pub mod message;
pub mod outbox;
pub mod render;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use chatbot_types::chat::ConversationId;

use self::conversation::ConversationCommand;
use self::outbox::OutboxCommand;

/// Talk to a chat bot, even while offline.
///
/// Messages written without a connection are queued and delivered in order
/// once the network is back.
#[derive(Parser)]
#[command(name = "chatbot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Treat the network as unreachable; messages go to the outbox.
    #[arg(long, global = true)]
    pub offline: bool,

    /// Conversation to use (defaults to the most recently started one).
    #[arg(long, short = 'c', global = true, env = "CHATBOT_CONVERSATION")]
    pub conversation: Option<ConversationId>,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true, hide = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Send a message (queued if offline).
    Send {
        /// Message text. Multiple words are joined with spaces.
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Deliver queued messages now, if online.
    Replay,

    /// Show the history of the current conversation.
    History {
        /// Only show the last N messages.
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Inspect or clean up the offline outbox (default: list).
    Outbox {
        #[command(subcommand)]
        action: Option<OutboxCommand>,
    },

    /// List or start conversations (default: list).
    #[command(alias = "convo")]
    Conversations {
        #[command(subcommand)]
        action: Option<ConversationCommand>,
    },

    /// Start an interactive chat.
    Chat,

    /// Connection, queue, and storage status.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_send_joins_words() {
        let cli = Cli::try_parse_from(["chatbot", "send", "hello", "there"]).unwrap();
        match cli.command {
            Commands::Send { message } => assert_eq!(message.join(" "), "hello there"),
            _ => panic!("expected send"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["chatbot", "history", "--offline", "-c", "3", "--json"]).unwrap();
        assert!(cli.offline);
        assert!(cli.json);
        assert_eq!(cli.conversation, Some(ConversationId(3)));
    }

    #[test]
    fn test_parse_rejects_bad_conversation_id() {
        assert!(Cli::try_parse_from(["chatbot", "-c", "abc", "history"]).is_err());
    }

    #[test]
    fn test_parse_outbox_drop() {
        let cli = Cli::try_parse_from(["chatbot", "outbox", "drop", "7"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Outbox {
                action: Some(OutboxCommand::Drop { id: 7 })
            }
        ));
    }

    #[test]
    fn test_parse_send_requires_text() {
        assert!(Cli::try_parse_from(["chatbot", "send"]).is_err());
    }
}
