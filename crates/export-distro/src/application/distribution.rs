//! # Distribution Loop
//!
//! Top-level control loop of the distro. It owns the [`Reconciler`] (and
//! through it the actor registry) and multiplexes four inputs:
//!
//! ```text
//!   shutdown (oneshot) ──┐
//!   actor reports ───────┤
//!   registrations changed┼──> select! ──> reconcile / distribute / drain
//!   events ──────────────┘
//! ```
//!
//! ## Lifecycle
//!
//! 1. Read the store and reconcile once.
//! 2. Loop until the shutdown signal arrives, the store fails, or the event
//!    source closes.
//! 3. Terminate every actor (bounded by `shutdown_timeout`) and return.
//!
//! Inputs are polled in the order shown above. A change notified before
//! an event is therefore applied before that event is distributed.
//!
//! Store failures and a closed event source are fatal: the loop still
//! drains its actors before returning the error.

use std::fmt;
use std::sync::Arc;

use export_telemetry::{metric_inc, EVENTS_RECEIVED};
use export_types::Event;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use super::actor::ActorReport;
use super::reconciler::{ReconcileSummary, Reconciler};
use crate::config::DistroConfig;
use crate::domain::DistroError;
use crate::ports::RegistrationStore;

/// Payload-free "the desired registration set may have changed" signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationsChanged;

/// Why the distro was asked to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Process received an interrupt
    Interrupted,
    /// Explicit request from the embedding application
    Requested(String),
    /// A collaborator failed and the process is going down
    Fatal(String),
    /// The shutdown sender was dropped without sending
    SignalLost,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupted => f.write_str("interrupted"),
            Self::Requested(reason) => write!(f, "requested: {}", reason),
            Self::Fatal(reason) => write!(f, "fatal: {}", reason),
            Self::SignalLost => f.write_str("shutdown signal lost"),
        }
    }
}

/// Inputs consumed by [`DistributionLoop::run`].
pub struct DistroSignals {
    pub events: mpsc::Receiver<Event>,
    pub changes: mpsc::Receiver<RegistrationsChanged>,
    pub shutdown: oneshot::Receiver<ShutdownReason>,
}

/// Producer side of [`DistroSignals`].
#[derive(Debug)]
pub struct DistroHandle {
    pub events: mpsc::Sender<Event>,
    pub changes: ChangeNotifier,
    pub shutdown: oneshot::Sender<ShutdownReason>,
}

/// Cloneable sender of change notifications.
///
/// The channel holds a single pending notification; notifying while one is
/// already pending is a no-op because the loop re-reads the whole set
/// anyway.
#[derive(Debug, Clone)]
pub struct ChangeNotifier(mpsc::Sender<RegistrationsChanged>);

impl ChangeNotifier {
    /// Signal a change. Returns `false` if the loop has stopped.
    pub fn notify(&self) -> bool {
        match self.0.try_send(RegistrationsChanged) {
            Ok(()) | Err(mpsc::error::TrySendError::Full(_)) => true,
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }
}

impl DistroSignals {
    /// Create connected signal channels. `event_capacity` bounds the events
    /// waiting for the loop.
    pub fn channel(event_capacity: usize) -> (DistroHandle, DistroSignals) {
        let (events_tx, events_rx) = mpsc::channel(event_capacity.max(1));
        let (changes_tx, changes_rx) = mpsc::channel(1);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        (
            DistroHandle {
                events: events_tx,
                changes: ChangeNotifier(changes_tx),
                shutdown: shutdown_tx,
            },
            DistroSignals {
                events: events_rx,
                changes: changes_rx,
                shutdown: shutdown_rx,
            },
        )
    }
}

/// How the loop ended normally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopExit {
    pub reason: ShutdownReason,
    /// Actors terminated during the final drain
    pub stopped_actors: usize,
    /// Events received over the loop's lifetime
    pub events_received: u64,
}

/// The distro's control loop.
pub struct DistributionLoop {
    store: Arc<dyn RegistrationStore>,
    reconciler: Reconciler,
    reports: mpsc::UnboundedReceiver<ActorReport>,
    config: DistroConfig,
    events_received: u64,
}

impl DistributionLoop {
    pub fn new(store: Arc<dyn RegistrationStore>, config: DistroConfig) -> Self {
        let (reports_tx, reports_rx) = mpsc::unbounded_channel();
        Self {
            store,
            reconciler: Reconciler::new(config.clone(), reports_tx),
            reports: reports_rx,
            config,
            events_received: 0,
        }
    }

    /// Run until shutdown.
    pub async fn run(mut self, signals: DistroSignals) -> Result<LoopExit, DistroError> {
        let DistroSignals {
            mut events,
            mut changes,
            mut shutdown,
        } = signals;

        info!("Starting distribution loop");
        if let Err(e) = self.refresh().await {
            return self.fail(e).await;
        }

        let mut changes_open = true;
        loop {
            tokio::select! {
                biased; // Shutdown, reports and changes before events

                reason = &mut shutdown => {
                    let reason = reason.unwrap_or(ShutdownReason::SignalLost);
                    info!(reason = %reason, "Shutdown signal received");
                    return Ok(self.drain(reason).await);
                }

                Some(report) = self.reports.recv() => {
                    self.reconciler.handle_report(report);
                }

                change = changes.recv(), if changes_open => match change {
                    Some(RegistrationsChanged) => {
                        // Coalesce a burst into one re-read.
                        while changes.try_recv().is_ok() {}
                        if let Err(e) = self.refresh().await {
                            return self.fail(e).await;
                        }
                    }
                    None => {
                        debug!("Change notifier closed, registrations are now fixed");
                        changes_open = false;
                    }
                },

                event = events.recv() => match event {
                    Some(event) => {
                        self.events_received += 1;
                        metric_inc!(EVENTS_RECEIVED);
                        let fan_out = self.reconciler.distribute(Arc::new(event));
                        debug!(delivered = fan_out.delivered, dropped = fan_out.dropped, "Event distributed");
                    }
                    None => return self.fail(DistroError::EventSourceClosed).await,
                },
            }
        }
    }

    /// Re-read the store and reconcile.
    async fn refresh(&mut self) -> Result<ReconcileSummary, DistroError> {
        let desired = self.store.list_registrations().await?;
        debug!(count = desired.len(), "Registrations listed");
        Ok(self.reconciler.reconcile(desired))
    }

    async fn drain(&mut self, reason: ShutdownReason) -> LoopExit {
        let stopped_actors = self.reconciler.shutdown(self.config.shutdown_timeout).await;
        info!(
            reason = %reason,
            stopped_actors,
            events_received = self.events_received,
            "Distribution loop stopped"
        );
        LoopExit {
            reason,
            stopped_actors,
            events_received: self.events_received,
        }
    }

    async fn fail(&mut self, error: DistroError) -> Result<LoopExit, DistroError> {
        error!(error = %error, "Distribution loop failed, shutting down");
        let stopped = self.reconciler.shutdown(self.config.shutdown_timeout).await;
        if stopped > 0 {
            warn!(stopped_actors = stopped, "Actors stopped after failure");
        }
        Err(error)
    }
}
