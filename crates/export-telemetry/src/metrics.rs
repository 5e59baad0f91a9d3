//! Prometheus metrics for the export distro.
//!
//! All metrics follow the naming convention: `edge_export_<area>_<metric>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g. events_received_total)
//! - **Gauge**: Value that can go up or down (e.g. active_registrations)

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Gauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // DISTRIBUTION METRICS
    // =========================================================================

    /// Events accepted by the distribution loop
    pub static ref EVENTS_RECEIVED: Counter = Counter::new(
        "edge_export_distro_events_received_total",
        "Total events received by the distribution loop"
    ).expect("metric creation failed");

    /// Events placed in a registration inbox
    pub static ref EVENTS_DELIVERED: Counter = Counter::new(
        "edge_export_distro_events_delivered_total",
        "Total events enqueued to registration inboxes"
    ).expect("metric creation failed");

    /// Events dropped because a registration inbox was full
    pub static ref EVENTS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("edge_export_distro_events_dropped_total", "Events dropped per registration"),
        &["registration"]
    ).expect("metric creation failed");

    /// Live registration actors
    pub static ref ACTIVE_REGISTRATIONS: Gauge = Gauge::new(
        "edge_export_distro_active_registrations",
        "Number of running registration actors"
    ).expect("metric creation failed");

    /// Reconciliation actions
    pub static ref RECONCILE_ACTIONS: CounterVec = CounterVec::new(
        Opts::new("edge_export_distro_reconcile_actions_total", "Reconciliation actions"),
        &["action"]  // action: created/updated/terminated/rejected/removed
    ).expect("metric creation failed");

    // =========================================================================
    // PIPELINE METRICS
    // =========================================================================

    /// Events rejected by a registration filter
    pub static ref EVENTS_FILTERED: Counter = Counter::new(
        "edge_export_pipeline_events_filtered_total",
        "Total events dropped by registration filters"
    ).expect("metric creation failed");

    /// Sender outcomes
    pub static ref SENDS: CounterVec = CounterVec::new(
        Opts::new("edge_export_pipeline_sends_total", "Sends by destination and outcome"),
        &["destination", "outcome"]  // outcome: success/failure
    ).expect("metric creation failed");

    /// Per-event pipeline failures
    pub static ref PIPELINE_FAILURES: CounterVec = CounterVec::new(
        Opts::new("edge_export_pipeline_failures_total", "Pipeline failures by stage"),
        &["stage"]  // stage: format/compress/encrypt/send
    ).expect("metric creation failed");
}

/// Register all metrics with the global registry.
///
/// Safe to call more than once; metrics that are already registered are
/// left in place.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Distribution
        Box::new(EVENTS_RECEIVED.clone()),
        Box::new(EVENTS_DELIVERED.clone()),
        Box::new(EVENTS_DROPPED.clone()),
        Box::new(ACTIVE_REGISTRATIONS.clone()),
        Box::new(RECONCILE_ACTIONS.clone()),
        // Pipeline
        Box::new(EVENTS_FILTERED.clone()),
        Box::new(SENDS.clone()),
        Box::new(PIPELINE_FAILURES.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn gather_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
