//! Raidline terminal binary - composition root.
//!
//! 1. Parse CLI flags and load configuration from TOML
//! 2. Build the item API (HTTP, or in-memory with `--offline`)
//! 3. Run a chat session over stdin/stdout, one line per turn

mod cli;

use std::io::Write;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use raidline_chat::ChatSession;
use raidline_client::HttpItemApi;
use raidline_command::{ExecutionGateway, InMemoryItemApi, ItemApi, ItemDefaults};
use raidline_core::RaidlineConfig;

use crate::cli::CliArgs;

const EXIT_COMMANDS: &[&str] = &["exit", "quit", ":q"];

fn print_prompt(session: &ChatSession) {
    let step = session
        .progress()
        .map(|p| format!(" {}/{}", p.current + 1, p.total))
        .unwrap_or_default();
    print!("{}{}> ", session.project_key(), step);
    let _ = std::io::stdout().flush();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = RaidlineConfig::load_or_default(&config_file);
    args.apply(&mut config);

    // Tracing. Stdout belongs to the conversation.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting Raidline v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration resolved");

    let Some(project_key) = args.resolve_project(&config) else {
        eprintln!("No project selected. Pass --project KEY or set chat.default_project.");
        std::process::exit(2);
    };

    // Item API.
    let api: Arc<dyn ItemApi> = if args.offline {
        tracing::info!("Offline mode: items are kept in memory");
        Arc::new(InMemoryItemApi::new())
    } else {
        let api = HttpItemApi::from_config(&config.api)?;
        tracing::info!(base_url = %api.base_url(), "Using item API");
        Arc::new(api)
    };

    let gateway = ExecutionGateway::new(api, ItemDefaults::from(&config.defaults));
    let mut session = ChatSession::new(project_key, config.chat.clone(), gateway);
    tracing::info!(session_id = %session.id(), project_key = %session.project_key(), "Session started");

    println!(
        "Raidline - working on {}. Type a command, \"cancel\" to abandon one, \"exit\" to leave.",
        session.project_key()
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_prompt(&session);
    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if EXIT_COMMANDS.contains(&text) {
            break;
        }
        if text.is_empty() {
            print_prompt(&session);
            continue;
        }

        match session.handle_message(text).await {
            Ok(replies) => {
                for reply in replies {
                    println!("{}", reply.content);
                }
            }
            Err(e) => println!("{}", e),
        }
        print_prompt(&session);
    }

    tracing::info!(
        session_id = %session.id(),
        messages = session.transcript().len(),
        "Session ended"
    );
    Ok(())
}
