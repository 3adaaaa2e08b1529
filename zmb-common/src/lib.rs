//! ZMB Common Library
//!
//! Shared types and plumbing for the ZMB request/reply protocol, which lets a
//! client read and write named data points of a Modbus-speaking server over
//! Zenoh queries:
//!
//! - [`envelope`] - Single-key request/response envelopes and frame validation
//! - [`value`] - Data point values (boolean or numeric)
//! - [`error`] - Error taxonomy (`ProtocolError`, `FrameError`) and common errors
//! - [`address`] - Responder addresses (`<key-expr>[@<locator>,...]`)
//! - [`config`] - Configuration loading (JSON5 format)
//! - [`session`] - Zenoh session management

pub mod address;
pub mod config;
pub mod envelope;
pub mod error;
pub mod session;
pub mod value;

// Re-export commonly used types at the crate root
pub use address::{Address, KEY_PREFIX};
pub use config::{LogFormat, LoggingConfig, ZenohConfig, load_config, parse_config};
pub use envelope::{GetResult, Kind, Path, Request, Response, SetResult, split_frame};
pub use error::{Error, ErrorKind, FrameError, ProtocolError, Result};
pub use session::connect;
pub use value::{ParseValueError, Value};

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over the configured level. Supports two
/// output formats:
/// - `LogFormat::Text` (default): Human-readable text format
/// - `LogFormat::Json`: Structured JSON format for log aggregation systems
///
/// Logs go to stderr so that command output on stdout stays parseable.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match config.format {
        LogFormat::Text => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .with(filter)
                .try_init()
                .map_err(|e| Error::Config(format!("Failed to initialize tracing: {}", e)))?;
        }
    }

    Ok(())
}
