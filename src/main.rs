use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use racecal::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "racecal",
    version,
    about = "Taipei road race calendar crawler and event query API",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); RACECAL_* environment variables otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); overrides the configuration
    #[arg(long, global = true)]
    log_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch the contest page once and replace the stored events
    Crawl {
        /// Parse and print the events without storing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse a saved contest page and print the events as JSON
    Parse {
        /// Saved contest page HTML
        #[arg(long)]
        html_file: PathBuf,

        /// Year of the first listed month
        #[arg(long)]
        year: i32,
    },

    /// Serve the event API and crawl on schedule
    Serve {
        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve stored events only, never crawl
        #[arg(long)]
        no_scheduler: bool,
    },

    /// Query stored events, e.g. `--query "distances=MARATHON&onlyRegistering=true"`
    Events {
        /// Query string with the same parameters as GET /events
        #[arg(short, long, default_value = "")]
        query: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    if let Some(format) = &cli.log_format {
        config.logging.format = format.clone();
    }
    config.validate().context("Invalid configuration")?;

    // Initialize tracing/logging
    setup_tracing(&config.logging.format, &config.logging.level, cli.verbose)?;

    match cli.command {
        Commands::Crawl { dry_run } => {
            tracing::info!(url = %config.source.url, dry_run, "Starting crawl command");
            commands::crawl(&config, dry_run).await?;
        }

        Commands::Parse { html_file, year } => {
            tracing::info!(file = %html_file.display(), year, "Starting parse command");
            commands::parse(&html_file, year)?;
        }

        Commands::Serve {
            host,
            port,
            no_scheduler,
        } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            tracing::info!(
                addr = %config.bind_address(),
                scheduler = !no_scheduler,
                "Starting serve command"
            );
            commands::serve(config, !no_scheduler).await?;
        }

        Commands::Events { query } => {
            commands::events(&config, &query)?;
        }
    }

    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("racecal=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("racecal={level},warn")))
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
