//! Chainwatch CLI
//!
//! Command-line interface for the Torn chain watcher.

use std::path::PathBuf;
use std::process::ExitCode;

use chainwatch::models::{ChainActivity, ChainReport};
use chainwatch::monitor::{StatusProvider, TornClient};
use chainwatch::service::ChainWatcher;
use chainwatch::Config;
use clap::{Parser, Subcommand};
use tracing::info;

/// Chainwatch - Torn chain alerts for Discord
#[derive(Parser)]
#[command(name = "chainwatch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "CHAINWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (for commands that support it)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the chain monitor and the command API
    Serve {
        /// Start with monitoring enabled
        #[arg(long)]
        watch: bool,

        /// Command API port
        #[arg(long, env = "CHAINWATCH_HTTP_PORT")]
        http_port: Option<u16>,
    },

    /// Fetch the chain once and report on it
    Check,

    /// Print the effective configuration with secrets masked
    Config,
}

#[tokio::main]
async fn main() -> ExitCode {
    // .env is optional; load it before clap reads env-backed arguments
    let _ = dotenvy::dotenv();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_logging(&config, cli.verbose);

    // Execute command
    let result = match cli.command {
        Commands::Serve { watch, http_port } => run_serve(config, watch, http_port).await,
        Commands::Check => run_check(config, cli.format).await,
        Commands::Config => run_config(&config, cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(config: &Config, verbose: bool) {
    let log_level = if verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    if config.logging.format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn run_serve(mut config: Config, watch: bool, http_port: Option<u16>) -> anyhow::Result<()> {
    if watch {
        config.monitor.start_watching = true;
    }
    if let Some(port) = http_port {
        config.server.port = port;
    }
    config.validate()?;

    info!(
        addr = %config.server.addr(),
        chain_threshold = config.monitor.chain_threshold_secs,
        alert_threshold = config.monitor.alert_threshold_secs,
        watching = config.monitor.start_watching,
        "Starting chainwatch"
    );

    let watcher = ChainWatcher::new(config)?;
    watcher.start().await?;

    Ok(())
}

async fn run_check(config: Config, format: OutputFormat) -> anyhow::Result<()> {
    if config.torn.api_key.trim().is_empty() {
        anyhow::bail!("Torn API key is not set (TORN_TOKEN)");
    }

    let client = TornClient::new(&config.torn)?;
    let report = client.fetch_chain().await?;
    let now = chrono::Utc::now().timestamp();

    match (report, format) {
        (ChainReport::ApiError(err), _) => anyhow::bail!("Torn API error: {err}"),
        (ChainReport::Status(status), OutputFormat::Json) => {
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        (ChainReport::Status(status), OutputFormat::Text) => match status.activity() {
            ChainActivity::Inactive(reason) => println!("Chain inactive: {reason}"),
            ChainActivity::Active => {
                let remaining = status.remaining_at(now);
                println!("Chain active");
                println!("  Hits:      {}/{}", status.current, status.max);
                println!("  Modifier:  {}x", status.modifier);
                println!("  Remaining: {remaining}s");
                if remaining < config.monitor.chain_threshold_secs {
                    println!(
                        "  Below the {}s chain threshold",
                        config.monitor.chain_threshold_secs
                    );
                }
            }
        },
    }

    Ok(())
}

fn run_config(config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let redacted = config.redacted();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&redacted)?),
        OutputFormat::Text => {
            println!("[torn]");
            println!("  api_key          = {}", redacted.torn.api_key);
            println!("  base_url         = {}", redacted.torn.base_url);
            println!("  request_timeout  = {:?}", redacted.torn.request_timeout);
            println!("[discord]");
            println!("  bot_token        = {}", redacted.discord.bot_token);
            println!("  channel_id       = {}", redacted.discord.channel_id);
            println!("[monitor]");
            println!("  chain_threshold  = {}s", redacted.monitor.chain_threshold_secs);
            println!("  alert_threshold  = {}s", redacted.monitor.alert_threshold_secs);
            println!("  tick_interval    = {:?}", redacted.monitor.tick_interval);
            println!("  start_watching   = {}", redacted.monitor.start_watching);
            println!("[server]");
            println!("  addr             = {}", redacted.server.addr());
        }
    }

    if let Err(e) = config.validate() {
        eprintln!("warning: {e}");
    }
    Ok(())
}
