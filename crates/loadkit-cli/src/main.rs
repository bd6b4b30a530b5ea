use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod config;

use app::App;
use commands::*;
use config::Config;

#[derive(Parser)]
#[command(name = "lk")]
#[command(author, version, about = "Loadkit - LRU caching and prioritized lazy loading", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a cache access trace and print the resulting recency order
    Cache {
        /// Maximum number of entries (overrides the config file)
        #[arg(long)]
        capacity: Option<usize>,

        /// Ops to replay: set:key, get:key, has:key, del:key, or a bare key
        #[arg(short, long, value_delimiter = ',', required = true)]
        keys: Vec<String>,
    },

    /// Queue simulated resources and drain them by priority
    Queue {
        /// Resources to load (format: id:priority[:fail])
        #[arg(short, long, value_delimiter = ',', required = true)]
        items: Vec<String>,

        /// Simulated load time per resource in milliseconds
        #[arg(long, default_value = "50")]
        load_ms: u64,
    },

    /// Preload components twice and show the cache contents
    Components {
        /// Component names to preload
        #[arg(short, long, value_delimiter = ',', required = true)]
        keys: Vec<String>,

        /// Simulated load time per component in milliseconds
        #[arg(long, default_value = "50")]
        load_ms: u64,
    },

    /// Write the default configuration to a file
    Config {
        /// Output file
        #[arg(short, long, default_value = "loadkit.json")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    // Load configuration
    let mut config = if let Some(config_path) = cli.config {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };

    print_banner();

    match cli.command {
        Commands::Cache { capacity, keys } => {
            if let Some(capacity) = capacity {
                config.cache.capacity = capacity;
                config.validate()?;
            }
            run_cache_trace(&config, &keys)?;
        }
        Commands::Queue { items, load_ms } => {
            let app = App::new(config)?;
            run_queue(&app, &items, load_ms).await?;
        }
        Commands::Components { keys, load_ms } => {
            let app = App::new(config)?;
            run_components(&app, &keys, load_ms).await?;
        }
        Commands::Config { output } => {
            write_default_config(&output)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        "loadkit_cli=debug,loadkit_core=debug,loadkit_cache=debug,loadkit_queue=debug,loadkit_components=debug"
    } else {
        "loadkit_cli=info,loadkit_queue=info,loadkit_components=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

fn print_banner() {
    println!(
        "{}",
        r#"
  _                 _ _    _ _
 | | ___   __ _  __| | | _(_) |_
 | |/ _ \ / _` |/ _` | |/ / | __|
 | | (_) | (_| | (_| |   <| | |_
 |_|\___/ \__,_|\__,_|_|\_\_|\__|
    "#
        .bright_cyan()
    );
    println!(
        "{}",
        "LRU caching and prioritized lazy loading v0.1.0\n".bright_yellow()
    );
}
