//! # Export Runtime
//!
//! Wires the collaborators around the distribution loop:
//!
//! ```text
//!  HTTP control surface ──events/changes──┐
//!  event simulator ───────events──────────┼──> DistributionLoop ──> sinks
//!  shutdown future ───────shutdown────────┘          ^
//!                                                    │
//!                                 JsonFileRegistrationStore
//! ```
//!
//! ## Shutdown Sequence
//!
//! 1. The shutdown future resolves or the HTTP server stops
//! 2. The reason is sent on the loop's one-shot shutdown channel
//! 3. The loop terminates every actor and returns
//! 4. The server and simulator tasks are aborted
//!
//! If the loop ends on its own (store failure), its error is returned.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use export_distro::{
    DistributionLoop, DistroHandle, DistroSignals, LoopExit, RegistrationStore, ShutdownReason,
};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::adapters::JsonFileRegistrationStore;
use crate::config::RuntimeConfig;
use crate::http::{router, AppState};
use crate::simulator::spawn_simulator;

/// The assembled distro service.
pub struct ExportRuntime {
    config: RuntimeConfig,
    store: Arc<dyn RegistrationStore>,
}

impl ExportRuntime {
    /// Runtime reading registrations from the configured JSON file.
    pub fn new(config: RuntimeConfig) -> Self {
        let store = Arc::new(JsonFileRegistrationStore::new(
            config.registrations_path.clone(),
        ));
        Self { config, store }
    }

    /// Runtime with a caller-provided registration store.
    pub fn with_store(config: RuntimeConfig, store: Arc<dyn RegistrationStore>) -> Self {
        Self { config, store }
    }

    /// Serve the control surface on `listener` and run the distribution loop
    /// until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<LoopExit>
    where
        F: Future<Output = ShutdownReason> + Send,
    {
        let (handle, signals) = DistroSignals::channel(self.config.event_buffer);
        let DistroHandle {
            events,
            changes,
            shutdown: shutdown_tx,
        } = handle;

        let addr = listener
            .local_addr()
            .context("Failed to read control surface address")?;
        let app = router(AppState {
            events: events.clone(),
            changes,
        });
        info!(addr = %addr, "Starting HTTP control surface");
        let mut server = tokio::spawn(async move { axum::serve(listener, app).await });

        let simulator = self
            .config
            .simulate_interval
            .map(|interval| spawn_simulator(events.clone(), interval));
        drop(events);

        let mut distro =
            tokio::spawn(DistributionLoop::new(self.store, self.config.distro).run(signals));

        let outcome = tokio::select! {
            reason = shutdown => {
                let _ = shutdown_tx.send(reason);
                (&mut distro).await
            }
            result = &mut server => {
                let reason = match result {
                    Ok(Ok(())) => ShutdownReason::Fatal("HTTP server stopped".to_string()),
                    Ok(Err(e)) => ShutdownReason::Fatal(format!("HTTP server failed: {}", e)),
                    Err(e) => ShutdownReason::Fatal(format!("HTTP server task failed: {}", e)),
                };
                warn!(reason = %reason, "Control surface down, stopping distro");
                let _ = shutdown_tx.send(reason);
                (&mut distro).await
            }
            result = &mut distro => result,
        };

        server.abort();
        if let Some(simulator) = simulator {
            simulator.abort();
        }

        let exit = outcome.context("Distribution loop task failed")??;
        Ok(exit)
    }
}

/// Resolves on Ctrl-C.
///
/// If the signal handler cannot be installed this never resolves; the
/// process then stops only through the other shutdown paths.
pub async fn shutdown_signal() -> ShutdownReason {
    match tokio::signal::ctrl_c().await {
        Ok(()) => ShutdownReason::Interrupted,
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending().await
        }
    }
}
