//! Command-line client for ZMB responders.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use zmb_client::{Client, ClientConfig};
use zmb_common::{Address, Value};

/// Read and write Modbus data points over Zenoh.
#[derive(Parser, Debug)]
#[command(name = "zmb")]
#[command(about = "Queries and updates data points exposed by a ZMB responder")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Responder address, overrides the configuration (`<key-expr>[@<locator>,...]`)
    #[arg(short, long)]
    address: Option<String>,

    /// Transport-level query timeout in milliseconds.
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check that the responder echoes a fresh token.
    Test,
    /// Read one or more paths.
    Get {
        /// Paths to read, e.g. /plc01/slave1/temperature
        paths: Vec<String>,
    },
    /// Write one or more PATH=VALUE pairs.
    Set {
        /// Pairs to write, e.g. /plc01/slave1/setpoint=42 /plc01/slave1/pump=true
        #[arg(value_parser = parse_pair, required = true)]
        pairs: Vec<(String, Value)>,
    },
}

fn parse_pair(s: &str) -> std::result::Result<(String, Value), String> {
    let (path, value) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PATH=VALUE, got '{}'", s))?;
    let value = value.parse::<Value>().map_err(|e| e.to_string())?;
    Ok((path.to_string(), value))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let mut config = match &args.config {
        Some(path) => ClientConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {:?}", path))?,
        None => ClientConfig::default(),
    };

    // Apply command-line overrides
    if let Some(address) = &args.address {
        config.client.address = address.clone();
    }
    if args.timeout_ms.is_some() {
        config.client.timeout_ms = args.timeout_ms;
    }
    config.validate().context("Invalid configuration")?;

    // Initialize logging
    let log_config = config.logging.with_level_override(args.log_level.as_deref());
    zmb_common::init_tracing(&log_config)
        .map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

    let address: Address = config.client.address()?;

    // Connect to Zenoh
    info!(address = %address, "Connecting to responder");
    let mut client = Client::connect(&config.zenoh, &address)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Zenoh: {}", e))?;
    if let Some(timeout) = config.client.timeout() {
        client = client.with_timeout(timeout);
    }

    // Run the command, then close the session even if it failed
    let outcome = run(&mut client, args.command).await;

    client
        .close()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to close Zenoh session: {}", e))?;

    let alive = outcome?;
    if !alive {
        std::process::exit(1);
    }

    Ok(())
}

/// Execute one command and print its result; returns `false` on a failed
/// liveness check.
async fn run(client: &mut Client<zmb_client::ZenohChannel>, command: Command) -> Result<bool> {
    match command {
        Command::Test => {
            let alive = client.test().await.context("TEST failed")?;
            println!("{}", alive);
            Ok(alive)
        }
        Command::Get { paths } => {
            let values = client.get(paths).await.context("GET failed")?;
            println!("{}", serde_json::to_string_pretty(&values)?);
            Ok(true)
        }
        Command::Set { pairs } => {
            let outcomes = client.set(pairs).await.context("SET failed")?;
            println!("{}", serde_json::to_string_pretty(&outcomes)?);
            Ok(true)
        }
    }
}

