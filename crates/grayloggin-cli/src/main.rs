//! Grayloggin CLI
//!
//! Command-line front end for searching a log-management service

mod config;

use anyhow::{Context, bail};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use config::CliConfig;
use grayloggin_core::StreamRef;
use grayloggin_egress::{GraylogConnection, SearchSession};
use std::io::Write;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "grayloggin")]
#[command(about = "Grayloggin - search a log server from the command line", long_about = None)]
struct Cli {
    /// Path to a YAML or TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// API endpoint, e.g. graylog.internal:9000
    #[arg(long, global = true)]
    url: Option<String>,

    #[arg(short, long, global = true)]
    username: Option<String>,

    #[arg(long, global = true)]
    password: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List enabled streams
    Streams,
    /// Run a search and print matching messages as JSON lines
    Search {
        #[command(flatten)]
        window: SearchArgs,

        /// Stop after this many messages
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the number of matching messages
    Count {
        #[command(flatten)]
        window: SearchArgs,
    },
}

#[derive(Args)]
struct SearchArgs {
    /// Query string; empty matches everything
    #[arg(short, long, default_value = "")]
    query: String,

    /// Search the last N seconds
    #[arg(long, conflicts_with_all = ["from", "to"], required_unless_present = "from")]
    relative: Option<u64>,

    /// Start of an absolute range (RFC 3339)
    #[arg(long, requires = "to")]
    from: Option<DateTime<Utc>>,

    /// End of an absolute range (RFC 3339)
    #[arg(long, requires = "from")]
    to: Option<DateTime<Utc>>,

    /// Restrict to a stream by title; repeatable
    #[arg(short, long = "stream")]
    streams: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => CliConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path.display(), e))?,
        None => CliConfig::default(),
    };
    config.merge_env();

    if let Some(url) = cli.url {
        config.graylog.url = url;
    }
    if let Some(username) = cli.username {
        config.graylog.username = username;
    }
    if let Some(password) = cli.password {
        config.graylog.password = password;
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }

    init_tracing(&config.logging.level)?;

    let connection = GraylogConnection::new(
        &config.graylog.url,
        config.auth(),
        &config.client_config(),
    )?;
    info!(base_uri = connection.base_uri(), "Connected");

    match cli.command {
        Commands::Streams => {
            let directory = connection.streams()?;
            let mut out = std::io::stdout().lock();
            for (name, id) in directory.iter() {
                writeln!(out, "{}\t{}", id, name)?;
            }
        }
        Commands::Search { window, limit } => {
            let mut session = start(&connection, &config, &window)?;
            let mut out = std::io::stdout().lock();
            let mut printed = 0usize;

            for record in session.by_ref().take(limit.unwrap_or(usize::MAX)) {
                serde_json::to_writer(&mut out, &record)?;
                writeln!(out)?;
                printed += 1;
            }
            out.flush()?;

            info!(printed, pages = session.pages_fetched(), "Search finished");
            if let Some(failure) = session.failure() {
                bail!("Search failed: {}", failure);
            }
        }
        Commands::Count { window } => {
            let session = start(&connection, &config, &window)?;
            if let Some(failure) = session.failure() {
                bail!("Search failed: {}", failure);
            }
            println!("{}", session.reported_total());
        }
    }

    Ok(())
}

fn start(
    connection: &GraylogConnection,
    config: &CliConfig,
    args: &SearchArgs,
) -> anyhow::Result<SearchSession> {
    let streams: Vec<StreamRef> = if args.streams.is_empty() {
        Vec::new()
    } else {
        connection
            .streams()
            .context("Failed to list streams")?
            .resolve(&args.streams)?
    };

    let mut session = connection.search_with(config.search_config());
    match (args.relative, args.from, args.to) {
        (Some(seconds), _, _) => {
            session.start_relative(seconds, args.query.clone(), streams);
        }
        (None, Some(from), Some(to)) => {
            session.start_absolute(from, to, args.query.clone(), streams)?;
        }
        _ => bail!("Either --relative or both --from and --to are required"),
    }

    Ok(session)
}

fn init_tracing(level: &str) -> anyhow::Result<()> {
    let log_level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };

    let filter = EnvFilter::new(format!("{}", log_level));

    // stdout carries results; logs go to stderr
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
