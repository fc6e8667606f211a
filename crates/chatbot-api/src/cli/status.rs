//! Client status dashboard command.

use anyhow::Result;
use console::style;

use chatbot_core::chat::store::MessageStore;
use chatbot_infra::config::resolve_api_key;

use crate::state::AppState;

/// Display connectivity, outbox depth, and where things are stored.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let online = state.session.is_online();
    let queued = state.session.outbox().await?.len();
    let conversations = state.session.store().list_conversations().await?.len();
    let api_key_set = resolve_api_key(&state.config.api).is_some();

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "online": online,
            "conversation_id": state.session.conversation_id(),
            "conversations": conversations,
            "queued": queued,
            "api_key_configured": api_key_set,
            "endpoint": state.config.api.base_url,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let check_mark = |ok: bool| {
        if ok {
            format!("{}", style("✓").green())
        } else {
            format!("{}", style("✗").red())
        }
    };

    println!();
    println!("  {} chatbot v{}", style("⚡").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Connection ──").dim());
    println!(
        "  {} {}",
        check_mark(online),
        if online { "Online" } else { "Offline" }
    );
    println!("  {} API key configured", check_mark(api_key_set));
    println!("  Endpoint: {}", style(&state.config.api.base_url).dim());
    println!();

    println!("  {}", style("── Conversations ──").dim());
    println!(
        "  Current:  {}",
        style(state.session.conversation_id()).cyan()
    );
    println!("  Known:    {}", style(conversations).bold());
    if queued > 0 {
        println!("  Queued:   {}", style(queued).yellow().bold());
    } else {
        println!("  Queued:   {}", style(0).green());
    }
    println!();

    println!("  {}", style("── Storage ──").dim());
    println!(
        "  Data dir: {}",
        style(state.data_dir.display()).dim()
    );
    println!();

    Ok(())
}
