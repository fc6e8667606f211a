//! Conversation management: list and start new conversations.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use chatbot_core::chat::store::MessageStore;

use crate::state::AppState;

#[derive(Subcommand)]
pub enum ConversationCommand {
    /// List known conversations, newest first.
    #[command(alias = "ls")]
    List,

    /// Start a new conversation. Later commands use it by default.
    New,
}

pub async fn handle_conversation_command(
    state: &AppState,
    action: Option<ConversationCommand>,
    json: bool,
) -> Result<()> {
    match action.unwrap_or(ConversationCommand::List) {
        ConversationCommand::List => list_conversations(state, json).await,
        ConversationCommand::New => new_conversation(state, json).await,
    }
}

async fn list_conversations(state: &AppState, json: bool) -> Result<()> {
    let store = state.session.store();
    let conversations = store.list_conversations().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversations)?);
        return Ok(());
    }

    if conversations.is_empty() {
        println!();
        println!(
            "  {} No conversations yet. Start one with: {}",
            style("i").blue().bold(),
            style("chatbot chat").yellow()
        );
        println!();
        return Ok(());
    }

    let current = state.session.conversation_id();

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Started").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("").fg(Color::White),
    ]);

    for conversation in &conversations {
        let message_count = store.list_messages(conversation.id).await?.len();
        let marker = if conversation.id == current {
            Cell::new("current").fg(Color::Green)
        } else {
            Cell::new("")
        };

        table.add_row(vec![
            Cell::new(conversation.id.to_string()).fg(Color::Cyan),
            Cell::new(conversation.created_at.format("%Y-%m-%d %H:%M").to_string())
                .fg(Color::DarkGrey),
            Cell::new(message_count.to_string()),
            marker,
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

async fn new_conversation(state: &AppState, json: bool) -> Result<()> {
    let conversation = state.session.store().create_conversation().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&conversation)?);
        return Ok(());
    }

    println!(
        "  {} Started conversation {}",
        style("✓").green().bold(),
        style(conversation.id).cyan().bold()
    );
    Ok(())
}
