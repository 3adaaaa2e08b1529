//! Reference ZMB responder.
//!
//! Serves an in-memory data point store over Zenoh queries.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use zmb_responder::{Responder, ResponderConfig, serve};

/// Reference responder for the ZMB protocol.
#[derive(Parser, Debug)]
#[command(name = "zmb-responder")]
#[command(about = "Answers ZMB TEST/GET/SET queries from an in-memory store")]
#[command(version)]
struct Args {
    /// Path to configuration file (JSON5 format)
    #[arg(short, long, default_value = "zmb-responder.json5")]
    config: PathBuf,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = ResponderConfig::load_from_file(&args.config)
        .with_context(|| format!("Failed to load config from {:?}", args.config))?;

    // Initialize logging
    let log_config = config.logging.with_level_override(args.log_level.as_deref());
    zmb_common::init_tracing(&log_config)
        .map_err(|e| anyhow::anyhow!("Failed to init tracing: {}", e))?;

    info!("Starting zmb-responder");
    info!("Loaded configuration from {:?}", args.config);

    // Build the data point store
    let store = config.build_store();
    for (path, value) in store.points() {
        info!(
            path = %path,
            value = %value,
            read_only = store.is_read_only(path),
            data_type = ?store.data_type(path),
            "Point loaded"
        );
    }

    // Connect to Zenoh
    info!("Connecting to Zenoh...");
    let session = zmb_common::connect(&config.zenoh)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to Zenoh: {}", e))?;
    info!("Connected to Zenoh");

    let mut responder = Responder::new(store);

    // Serve until shutdown
    tokio::select! {
        result = serve(&session, &config.responder.key_expr, &mut responder) => {
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            info!("Received shutdown signal");
        }
    }

    session
        .close()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to close Zenoh session: {}", e))?;
    info!("zmb-responder stopped");

    Ok(())
}
