mod config;
mod console;
mod error;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use runtime::Session;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::Config;
use console::Console;
use error::Result;

const ASSISTANT_LABEL: &str = "Model";

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(about = "A terminal chat agent that can work on local files", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a config file (defaults to ./deckhand.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// List the tools the model can call
    Tools,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr so they never interleave with the chat on stdout.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Chat) | None => cmd_chat(cli.config).await,
        Some(Commands::Tools) => cmd_tools(),
    }
}

async fn cmd_chat(config_path: Option<PathBuf>) -> Result<()> {
    let mut config = Config::discover(config_path.as_deref())?;
    config.apply_env(|key| std::env::var(key).ok());

    let backend = config.backend()?;
    let registry = tools::builtin()?;
    tracing::info!(%backend, tools = registry.len(), "starting session");

    println!("deckhand v{}", env!("CARGO_PKG_VERSION"));
    println!("Model: {}", backend.model());
    println!("Tools: {}", registry.len());
    println!("Type 'quit' or Ctrl+D to exit.\n");

    let mut session = Session::new(backend, registry);
    if let Some(system) = config.system {
        session = session.with_system(system);
    }

    let mut input = io::stdin().lock();
    let mut console = Console::new(io::stdout(), ASSISTANT_LABEL);
    session.run(&mut input, &mut console).await?;

    let usage = session.usage();
    println!(
        "\nSession ended ({} turns, {} input / {} output tokens).",
        session.conversation().len(),
        usage.input_tokens,
        usage.output_tokens
    );
    Ok(())
}

fn cmd_tools() -> Result<()> {
    let registry = tools::builtin()?;

    for spec in registry.specs() {
        let summary = spec.description.lines().next().unwrap_or_default();
        println!("{:<16}  {summary}", spec.name);
    }

    Ok(())
}
