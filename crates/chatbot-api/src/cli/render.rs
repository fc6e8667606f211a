//! Shared terminal rendering for chat results.
//!
//! Every printer here has a styled form; callers handle `--json` themselves
//! by serializing the same values.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use chatbot_types::chat::{Author, ChatMessage};
use chatbot_types::config::NoticeConfig;
use chatbot_types::session::{ReplayReport, ReplayStop, SubmitOutcome};

/// Print a single bot line.
pub fn print_bot_line(bot_name: &str, text: &str) {
    println!("  {} {}", style(format!("{bot_name} >")).cyan().bold(), text);
}

/// Print what happened to a submitted message.
pub fn print_outcome(outcome: &SubmitOutcome, notices: &NoticeConfig) {
    match outcome {
        SubmitOutcome::Delivered { reply } => {
            print_bot_line(&reply.bot_name, &reply.text);
        }
        SubmitOutcome::Failed { cause } => {
            println!(
                "  {} Message not delivered: {}",
                style("!").red().bold(),
                style(cause).red()
            );
        }
        SubmitOutcome::QueuedOffline { entry } => {
            print_bot_line("Bot", &notices.offline_reply);
            print_bot_line("Bot", &notices.offline_saved);
            println!(
                "  {} Queued as outbox entry #{}",
                style("i").blue().bold(),
                entry.id
            );
        }
    }
}

/// Print the result of a replay pass.
///
/// A pass that looked at nothing prints only when `announce_empty` is set.
pub fn print_replay_report(report: &ReplayReport, announce_empty: bool) {
    if report.attempted == 0 && report.is_complete() {
        if announce_empty {
            println!(
                "  {} Nothing to replay (outbox empty or offline).",
                style("i").blue().bold()
            );
        }
        return;
    }

    if report.replayed > 0 {
        println!(
            "  {} Delivered {} queued message{}",
            style("✓").green().bold(),
            style(report.replayed).bold(),
            if report.replayed == 1 { "" } else { "s" }
        );
    }

    if let Some(failure) = &report.failure {
        let hint = match failure.cause {
            ReplayStop::Offline => "connection dropped",
            ReplayStop::Client(_) => "send failed",
            ReplayStop::Claimed => "another replay is running",
        };
        println!(
            "  {} Replay stopped ({hint}): {}",
            style("!").yellow().bold(),
            failure
        );
        println!(
            "  {}",
            style("Remaining messages stay queued. Run `chatbot replay` to retry.").dim()
        );
    }
}

/// Render conversation history as a table.
pub fn history_table(messages: &[ChatMessage]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Time").fg(Color::White),
        Cell::new("From").fg(Color::White),
        Cell::new("Message").fg(Color::White),
    ]);

    for message in messages {
        let author_cell = match message.author {
            Author::User => Cell::new("you").fg(Color::Green),
            Author::Bot => Cell::new("bot").fg(Color::Cyan),
        };
        table.add_row(vec![
            Cell::new(message.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
                .fg(Color::DarkGrey),
            author_cell,
            Cell::new(&message.text),
        ]);
    }

    table
}

/// Shorten `text` to at most `max` characters, marking the cut with `...`.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatbot_types::chat::{ConversationId, NewChatMessage};
    use uuid::Uuid;

    #[test]
    fn test_truncate_short_text_unchanged() {
        assert_eq!(truncate("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
    }

    #[test]
    fn test_history_table_has_row_per_message() {
        let messages = vec![
            NewChatMessage::user(ConversationId(1), "hi").with_id(Uuid::now_v7()),
            NewChatMessage::bot(ConversationId(1), "hello").with_id(Uuid::now_v7()),
        ];
        let table = history_table(&messages);
        assert_eq!(table.row_count(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("hello"));
    }
}
