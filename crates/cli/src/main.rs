//! Aula CLI — the main entry point.
//!
//! Commands:
//! - `serve`  — Start the HTTP gateway
//! - `ask`    — Answer a single question from the terminal
//! - `doctor` — Check configuration and provider credentials

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "aula",
    about = "Aula — backend del asistente virtual institucional",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = "aula.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP gateway server
    Serve {
        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question and print the answer
    Ask {
        /// The question
        message: String,
    },

    /// Check configuration, credentials, and knowledge directories
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config = aula_config::AppConfig::load(&cli.config)?;

    match cli.command {
        Commands::Serve { port } => commands::serve::run(config, port).await?,
        Commands::Ask { message } => commands::ask::run(config, &message).await?,
        Commands::Doctor => commands::doctor::run(&config),
    }

    Ok(())
}
