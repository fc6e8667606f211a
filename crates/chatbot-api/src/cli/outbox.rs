//! Outbox inspection and maintenance: list, clear, drop.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use chatbot_core::chat::store::MessageStore;
use chatbot_types::error::RepositoryError;

use super::render::truncate;
use crate::state::AppState;

#[derive(Subcommand)]
pub enum OutboxCommand {
    /// List queued messages, oldest first.
    #[command(alias = "ls")]
    List,

    /// Discard every queued message.
    Clear {
        /// Skip confirmation prompt.
        #[arg(long)]
        force: bool,
    },

    /// Discard a single queued message.
    #[command(alias = "rm")]
    Drop {
        /// Outbox entry id (see `chatbot outbox list`).
        id: i64,
    },
}

pub async fn handle_outbox_command(
    state: &AppState,
    action: Option<OutboxCommand>,
    json: bool,
) -> Result<()> {
    match action.unwrap_or(OutboxCommand::List) {
        OutboxCommand::List => list_outbox(state, json).await,
        OutboxCommand::Clear { force } => clear_outbox(state, force, json).await,
        OutboxCommand::Drop { id } => drop_entry(state, id, json).await,
    }
}

async fn list_outbox(state: &AppState, json: bool) -> Result<()> {
    let entries = state.session.outbox().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!();
        println!("  {} Outbox is empty.", style("✓").green().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Conversation").fg(Color::White),
        Cell::new("Queued").fg(Color::White),
        Cell::new("Message").fg(Color::White),
    ]);

    for entry in &entries {
        table.add_row(vec![
            Cell::new(entry.id.to_string()).fg(Color::Yellow),
            Cell::new(entry.conversation_id.to_string()).fg(Color::Cyan),
            Cell::new(entry.enqueued_at.format("%Y-%m-%d %H:%M").to_string()).fg(Color::DarkGrey),
            Cell::new(truncate(&entry.text, 60)),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} queued message{}",
        style(entries.len()).bold(),
        if entries.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

async fn clear_outbox(state: &AppState, force: bool, json: bool) -> Result<()> {
    let queued = state.session.outbox().await?.len();

    if queued == 0 {
        if json {
            println!("{}", serde_json::json!({ "removed": 0 }));
        } else {
            println!("  {} Outbox is already empty.", style("i").blue().bold());
        }
        return Ok(());
    }

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Discard {queued} queued message{}? They will never be sent.",
                if queued == 1 { "" } else { "s" }
            ))
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    let removed = state.session.store().clear_offline().await?;

    if json {
        println!("{}", serde_json::json!({ "removed": removed }));
    } else {
        println!(
            "  {} Discarded {} queued message{}",
            style("✓").green().bold(),
            style(removed).bold(),
            if removed == 1 { "" } else { "s" }
        );
    }

    Ok(())
}

async fn drop_entry(state: &AppState, id: i64, json: bool) -> Result<()> {
    match state.session.store().remove_offline(id).await {
        Ok(()) => {
            if json {
                println!("{}", serde_json::json!({ "removed": id }));
            } else {
                println!("  {} Dropped outbox entry #{id}", style("✓").green().bold());
            }
            Ok(())
        }
        Err(RepositoryError::NotFound) => {
            anyhow::bail!("Outbox entry #{id} not found (it may already have been sent)")
        }
        Err(e) => Err(e.into()),
    }
}
