//! Slash command parsing for the chat loop.
//!
//! Commands start with `/`; anything else is sent to the bot.

use console::style;

#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    Help,
    Clear,
    Exit,
    /// Show the last messages of this conversation.
    History,
    /// Show what is waiting in the outbox.
    Outbox,
    /// Replay the outbox now.
    Replay,
    /// Connectivity and queue summary.
    Status,
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        "/history" => Some(ChatCommand::History),
        "/outbox" | "/queue" => Some(ChatCommand::Outbox),
        "/replay" | "/retry" => Some(ChatCommand::Replay),
        "/status" => Some(ChatCommand::Status),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// Print the help text listing all available commands.
pub fn print_help() {
    let rows = [
        ("/help", "Show this help message"),
        ("/history", "Show recent messages"),
        ("/outbox", "Show messages waiting to be sent"),
        ("/replay", "Send queued messages now"),
        ("/status", "Show connection and queue status"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the chat"),
    ];

    println!();
    println!("  {}", style("Available commands:").bold());
    println!();
    for (name, description) in rows {
        println!("  {:<10} {}", style(name).cyan(), description);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_text_is_not_command() {
        assert_eq!(parse("hello there"), None);
        assert_eq!(parse("what about /help"), None);
    }

    #[test]
    fn test_parse_help() {
        assert_eq!(parse("/help"), Some(ChatCommand::Help));
        assert_eq!(parse("/h"), Some(ChatCommand::Help));
        assert_eq!(parse("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn test_parse_exit() {
        assert_eq!(parse("/exit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/quit"), Some(ChatCommand::Exit));
        assert_eq!(parse("/q"), Some(ChatCommand::Exit));
    }

    #[test]
    fn test_parse_outbox_and_replay() {
        assert_eq!(parse("/outbox"), Some(ChatCommand::Outbox));
        assert_eq!(parse("/queue"), Some(ChatCommand::Outbox));
        assert_eq!(parse("/replay"), Some(ChatCommand::Replay));
        assert_eq!(parse("/retry"), Some(ChatCommand::Replay));
    }

    #[test]
    fn test_parse_is_case_insensitive_and_ignores_args() {
        assert_eq!(parse("  /HISTORY  "), Some(ChatCommand::History));
        assert_eq!(parse("/status now"), Some(ChatCommand::Status));
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse("/dance"),
            Some(ChatCommand::Unknown("/dance".to_string()))
        );
    }
}
