use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use overscroll_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "overscroll")]
#[command(author, version, about = "Over-scroll bounce with pull-to-refresh and load-more")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Use this config file instead of ~/.config/overscroll/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive demo list
    Run,
    /// Replay a scripted gesture and print every presenter and listener call
    Simulate {
        /// TOML script to replay
        script: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the active configuration
    Config {
        /// Write the default configuration if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };
    let config = Arc::new(config);

    // The demo owns the terminal, so it stays quiet unless RUST_LOG asks otherwise
    let interactive = matches!(cli.command, Some(Commands::Run) | None);
    let default_filter = if interactive {
        "off".to_string()
    } else {
        config.general.log_level.clone()
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or(default_filter),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Handle commands
    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Simulate { script, json }) => {
            commands::simulate::run(&config, &script, json)
        }
        Some(Commands::Config { init }) => commands::config::run(&config, init),
    }
}
