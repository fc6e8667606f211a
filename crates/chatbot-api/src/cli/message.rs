//! One-shot message commands: send, replay, history.

use anyhow::Result;
use console::style;

use chatbot_types::session::SubmitOutcome;

use super::render::{history_table, print_outcome, print_replay_report};
use crate::state::AppState;

/// Send one message in the current conversation.
///
/// Anything still queued from earlier offline sends is replayed first so the
/// bot sees messages in the order they were written.
///
/// # Examples
///
/// ```bash
/// chatbot send "what's the weather like?"
/// chatbot --offline send "remember to buy milk"
/// ```
pub async fn send(state: &AppState, text: &str, json: bool) -> Result<()> {
    let session = &state.session;
    session.start().await?;

    let report = session.replay_if_online().await?;
    let outcome = session.submit(text).await?;

    if json {
        let out = serde_json::json!({
            "conversation_id": session.conversation_id(),
            "replay": report,
            "result": outcome,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    print_replay_report(&report, false);
    print_outcome(&outcome, &state.config.notices);

    if matches!(outcome, SubmitOutcome::Failed { .. }) {
        println!(
            "  {}",
            style("Your message was saved to history but got no reply.").dim()
        );
    }

    Ok(())
}

/// Replay the offline outbox now.
///
/// # Examples
///
/// ```bash
/// chatbot replay
/// chatbot replay --json
/// ```
pub async fn replay(state: &AppState, json: bool) -> Result<()> {
    let report = state.session.replay_if_online().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !state.session.is_online() && report.attempted == 0 {
        println!(
            "  {} Offline. Queued messages will be sent once you are back online.",
            style("i").blue().bold()
        );
        return Ok(());
    }

    print_replay_report(&report, true);
    Ok(())
}

/// Show the history of the current conversation.
///
/// # Examples
///
/// ```bash
/// chatbot history
/// chatbot history --limit 10
/// chatbot --conversation 2 history --json
/// ```
pub async fn history(state: &AppState, limit: Option<usize>, json: bool) -> Result<()> {
    let mut messages = state.session.history().await?;
    if let Some(limit) = limit {
        let skip = messages.len().saturating_sub(limit);
        messages.drain(..skip);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    let conversation_id = state.session.conversation_id();
    if messages.is_empty() {
        println!();
        println!(
            "  {} Conversation {} has no messages yet. Start with: {}",
            style("i").blue().bold(),
            style(conversation_id).cyan(),
            style("chatbot chat").yellow()
        );
        println!();
        return Ok(());
    }

    println!();
    println!("  Conversation {}", style(conversation_id).cyan().bold());
    println!();
    println!("{}", history_table(&messages));
    println!();

    Ok(())
}
