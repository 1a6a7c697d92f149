use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scrollsync_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "scrollsync")]
#[command(author, version, about = "A terminal reader that remembers where you stopped")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of ~/.config/scrollsync/config.toml
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a text file, resuming at the saved position
    Read {
        /// Document to read
        file: PathBuf,
    },
    /// List saved reading positions
    List,
    /// Forget the saved position of a document
    Forget {
        /// Document whose position should be removed
        file: PathBuf,
    },
    /// Run one restore cycle against a synthetic scroll surface
    Simulate(commands::simulate::SimulateArgs),
    /// Show the effective configuration
    Config {
        /// Write the default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::load()?,
    };
    let config = Arc::new(config);

    // The reader owns the terminal, so its logs go to a file
    init_logging(&config, matches!(cli.command, Commands::Read { .. }))?;

    match cli.command {
        Commands::Read { file } => commands::read::run(config, &file).await,
        Commands::List => commands::list::run(&config).await,
        Commands::Forget { file } => commands::forget::run(&config, &file).await,
        Commands::Simulate(args) => commands::simulate::run(&config, &args).await,
        Commands::Config { init } => commands::config::run(&config, init).await,
    }
}

fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| config.general.log_level.clone()),
    );

    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}
