//! Offline-capable chat bot client entry point.
//!
//! Binary name: `chatbot`
//!
//! Parses CLI arguments, sets up tracing, wires the chat session, then
//! dispatches to the command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;

use chatbot_observe::tracing_setup::{init_tracing, shutdown_tracing};
use cli::{Cli, Commands};
use state::{AppState, StartupOptions};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,chatbot_core=debug,chatbot_infra=debug,chatbot=debug",
        _ => "trace",
    };

    init_tracing(filter, cli.otel).map_err(|e| anyhow::anyhow!("Failed to set up logging: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "chatbot", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init(StartupOptions {
        force_offline: cli.offline,
        conversation: cli.conversation,
    })
    .await?;

    match cli.command {
        Commands::Send { message } => {
            cli::message::send(&state, &message.join(" "), cli.json).await?;
        }

        Commands::Replay => {
            cli::message::replay(&state, cli.json).await?;
        }

        Commands::History { limit } => {
            cli::message::history(&state, limit, cli.json).await?;
        }

        Commands::Outbox { action } => {
            cli::outbox::handle_outbox_command(&state, action, cli.json).await?;
        }

        Commands::Conversations { action } => {
            cli::conversation::handle_conversation_command(&state, action, cli.json).await?;
        }

        Commands::Chat => {
            cli::chat::loop_runner::run_chat_loop(&state).await?;
        }

        Commands::Status => {
            cli::status::status(&state, cli.json).await?;
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}
