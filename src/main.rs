//! Mnemo - memory-augmented chat for the console
//!
//! A small REPL around an OpenAI-compatible completion endpoint. The
//! model is offered two tools backed by an append-only text file, so it
//! can carry facts across sessions.

use std::io::{self, Write};

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod tools;

use config::prompts;
use config::Config;
use conversation::Message;
use crate::core::{is_exit_command, ChatEngine, MemoryStore};
use providers::OpenAiProvider;
use tools::ToolRegistry;

const FAREWELL: &str = "AI: Goodbye! It was nice talking with you.";
const INTERRUPT_FAREWELL: &str = "AI: Goodbye! Conversation interrupted.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mnemo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        model = %config.model,
        memory = %config.memory_file.display(),
        "starting mnemo"
    );

    let memory = MemoryStore::new(&config.memory_file);
    let registry = ToolRegistry::new(memory);
    let provider = OpenAiProvider::new(
        config.base_url.clone(),
        config.api_key.clone(),
        config.model.clone(),
    );
    let engine = ChatEngine::new(provider, registry);

    println!("Memory-Augmented Chat Console");
    println!("=============================");
    println!("I'm an AI assistant with memory capabilities.");
    println!("I can remember important information from our conversation.");
    println!("Type 'exit' or 'quit' to end the conversation.\n");

    // The whole session's history lives here; turns only append.
    let mut history = vec![Message::system(prompts::builtin::MEMORY_ASSISTANT)];

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("You: ");
        io::stdout().flush()?;

        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{INTERRUPT_FAREWELL}");
                // The pending stdin read would stall runtime shutdown.
                std::process::exit(0);
            }
            line = lines.next_line() => line?,
        };

        // None means stdin closed; treat it like an explicit exit.
        let Some(line) = line else {
            println!("{FAREWELL}");
            break;
        };
        let input = line.trim();

        if is_exit_command(input) {
            println!("{FAREWELL}");
            break;
        }

        match engine.run_turn(&mut history, input).await {
            Ok(answer) => println!("AI: {answer}"),
            Err(e) => {
                eprintln!("Error: {e}");
                println!("Please try again.");
            }
        }
    }

    Ok(())
}
