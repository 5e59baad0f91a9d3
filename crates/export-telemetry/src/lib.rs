//! # Export Telemetry
//!
//! Observability for the edge export distro.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an env filter, plain or JSON output
//! - **Metrics**: Prometheus counters and gauges for distribution and delivery
//!
//! ## Usage
//!
//! ```rust,ignore
//! use export_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! init_telemetry(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `EDGE_EXPORT_SERVICE_NAME` | `edge-export-distro` | Service name attached to logs |
//! | `EDGE_EXPORT_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `EDGE_EXPORT_JSON_LOGS` | `false` (`true` in containers) | Emit JSON lines |

mod config;
mod logging;
pub mod metrics;

pub use config::{LogFormat, TelemetryConfig};
pub use logging::init_logging;
pub use metrics::{
    gather_metrics, register_metrics, ACTIVE_REGISTRATIONS, EVENTS_DELIVERED, EVENTS_DROPPED,
    EVENTS_FILTERED, EVENTS_RECEIVED, PIPELINE_FAILURES, RECONCILE_ACTIONS, SENDS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and register all metrics.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    register_metrics()?;
    init_logging(config)?;
    Ok(())
}

/// Increment a counter, with label values for vector metrics.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
