//! # Edge Export Distro
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging, metrics registry)
//! 2. Load configuration from the environment
//! 3. Bind the HTTP control surface
//! 4. Run the distribution loop until Ctrl-C

use anyhow::{Context, Result};
use export_runtime::{shutdown_signal, ExportRuntime, RuntimeConfig};
use export_telemetry::{init_telemetry, TelemetryConfig};
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let telemetry = TelemetryConfig::from_env();
    init_telemetry(&telemetry).context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env().context("Invalid configuration")?;
    info!(
        port = config.http_port,
        registrations = %config.registrations_path.display(),
        simulate = config.simulate_interval.is_some(),
        inbox_capacity = config.distro.event_inbox_capacity,
        "Starting export distro"
    );

    let addr = config.http_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind control surface on {}", addr))?;

    let exit = ExportRuntime::new(config)
        .run(listener, shutdown_signal())
        .await?;

    info!(
        reason = %exit.reason,
        stopped_actors = exit.stopped_actors,
        events_received = exit.events_received,
        "Export distro terminated"
    );
    Ok(())
}
