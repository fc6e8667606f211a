//! Main chat loop orchestration.
//!
//! Opens the conversation (greeting on first use), shows recent history,
//! replays anything queued while offline, then reads lines until the user
//! leaves. Each line is either a slash command or a message for the bot.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use chatbot_types::chat::Author;
use chatbot_types::session::SubmitOutcome;

use crate::cli::render::{print_bot_line, print_outcome, print_replay_report, truncate};
use crate::state::AppState;

use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

/// How many past messages are shown when the chat opens.
const RECENT_HISTORY: usize = 10;

fn prompt(online: bool) -> String {
    if online {
        format!("  {} ", style("You >").green().bold())
    } else {
        format!("  {} ", style("You (offline) >").yellow().bold())
    }
}

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

async fn print_recent_history(state: &AppState, limit: usize) -> anyhow::Result<()> {
    let messages = state.session.history().await?;
    let skip = messages.len().saturating_sub(limit);

    for message in &messages[skip..] {
        match message.author {
            Author::User => println!("  {} {}", style("You >").green().bold(), message.text),
            Author::Bot => print_bot_line("Bot", &message.text),
        }
    }
    Ok(())
}

async fn replay_queued(state: &AppState) -> anyhow::Result<()> {
    if state.session.outbox().await?.is_empty() {
        return Ok(());
    }

    let spinner = spinner("sending queued messages...");
    let report = state.session.replay_if_online().await;
    spinner.finish_and_clear();

    print_replay_report(&report?, false);
    Ok(())
}

async fn print_outbox(state: &AppState) -> anyhow::Result<()> {
    let entries = state.session.outbox().await?;
    println!();
    if entries.is_empty() {
        println!("  {} Nothing queued.", style("✓").green().bold());
    }
    for entry in &entries {
        println!(
            "  {} {} {}",
            style(format!("#{}", entry.id)).yellow(),
            style(format!("[conversation {}]", entry.conversation_id)).dim(),
            truncate(&entry.text, 70)
        );
    }
    println!();
    Ok(())
}

/// Run the interactive chat loop for the current conversation.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let session = &state.session;
    let conversation_id = session.conversation_id();

    session.start().await?;
    let online = session.is_online();

    println!();
    println!(
        "  {} Conversation {}  {}",
        style("⚡").bold(),
        style(conversation_id).cyan().bold(),
        if online {
            style("online").green()
        } else {
            style("offline").yellow()
        }
    );
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to leave.").dim()
    );
    println!();

    print_recent_history(state, RECENT_HISTORY).await?;
    println!();
    replay_queued(state).await?;

    let (mut chat_input, _writer) = ChatInput::new(prompt(online))
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                println!("  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Line(text) if text.is_empty() => continue,
            InputEvent::Line(text) => text,
        };

        if let Some(cmd) = commands::parse(&text) {
            match cmd {
                ChatCommand::Help => commands::print_help(),
                ChatCommand::Clear => chat_input.clear(),
                ChatCommand::Exit => break,
                ChatCommand::History => {
                    println!();
                    print_recent_history(state, 20).await?;
                    println!();
                }
                ChatCommand::Outbox => print_outbox(state).await?,
                ChatCommand::Replay => {
                    let spinner = spinner("replaying...");
                    let report = session.replay_if_online().await;
                    spinner.finish_and_clear();
                    print_replay_report(&report?, true);
                }
                ChatCommand::Status => {
                    let queued = session.outbox().await?.len();
                    println!(
                        "  {} {}, {} queued",
                        style("i").blue().bold(),
                        if session.is_online() { "online" } else { "offline" },
                        queued
                    );
                }
                ChatCommand::Unknown(name) => {
                    println!(
                        "  {} Unknown command: {}. Type /help for available commands.",
                        style("?").yellow().bold(),
                        style(name).dim()
                    );
                }
            }
            continue;
        }

        // Keep the bot's view in order: older queued messages go out first.
        replay_queued(state).await?;

        let spinner = spinner("thinking...");
        let outcome = session.submit(&text).await;
        spinner.finish_and_clear();
        let outcome = outcome?;

        print_outcome(&outcome, &state.config.notices);
        chat_input.set_prompt(&prompt(!matches!(
            outcome,
            SubmitOutcome::QueuedOffline { .. }
        )));
    }

    chat_input.finish();
    info!(%conversation_id, "Chat loop ended");
    println!("\n  {}", style("Bye!").dim());
    Ok(())
}
