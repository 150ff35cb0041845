use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wikiscroll_core::{AppConfig, Source};

mod commands;

#[derive(Parser)]
#[command(name = "wikiscroll")]
#[command(author, version, about = "An endless terminal feed of Wikipedia articles")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the terminal feed
    Run {
        /// Source to open with (random, featured, alphabetical)
        #[arg(short, long)]
        source: Option<Source>,
    },
    /// Page through a source without the UI
    Fetch {
        /// Source to page through
        #[arg(short, long)]
        source: Option<Source>,
        /// Number of pages to fetch
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Show the configuration file path and effective settings
    Config {
        /// Write the default configuration to the config path
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    match cli.command {
        Some(Commands::Run { source }) => {
            init_file_logging(&config)?;
            commands::run::run(config, source).await
        }
        None => {
            init_file_logging(&config)?;
            commands::run::run(config, None).await
        }
        Some(Commands::Fetch { source, pages }) => {
            init_stderr_logging(&config);
            let source = source.unwrap_or(config.general.initial_source);
            commands::fetch::run(&config, source, pages).await
        }
        Some(Commands::Config { init }) => {
            init_stderr_logging(&config);
            commands::config::run(&config, init)
        }
    }
}

fn env_filter(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.general.log_level))
}

fn init_stderr_logging(config: &AppConfig) {
    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

/// The terminal UI owns the screen, so logs go to a file in the data directory
fn init_file_logging(config: &AppConfig) -> Result<()> {
    let log_path = config.log_path();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .init();
    Ok(())
}
