pub mod config;
pub mod error;

pub use config::{Config, LocationConfig, Units, ValidationResult, WeatherConfig};
pub use error::{AppError, ConfigError, LocationFailure, NetworkError, WeatherError};

use anyhow::Result;

/// Map a `-v` count to a tracing filter directive
pub fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing/logging.
///
/// `RUST_LOG` wins over `default_filter`. Logs go to stderr so rendered
/// weather output on stdout stays clean.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("Skycast core initialized");
    Ok(())
}
