//! Tracing setup for binaries embedding taskgrid.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use taskgrid_core::{Error, Result};

/// Install a global tracing subscriber.
///
/// `rust_log` overrides the filter (defaults to `info,taskgrid=debug`);
/// `json_logs` switches the fmt layer to JSON output for log shippers.
pub fn configure_tracing(rust_log: Option<&str>, json_logs: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::new(rust_log.unwrap_or("info,taskgrid=debug"));
    let registry = tracing_subscriber::registry().with(env_filter);

    if json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| Error::config(format!("Failed to install tracing subscriber: {}", e)))?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .map_err(|e| Error::config(format!("Failed to install tracing subscriber: {}", e)))?;
    }

    Ok(())
}
