//! # Registration Actor
//!
//! One Tokio task per live registration. The actor owns its pipeline
//! outright; nothing outside the task ever touches it.
//!
//! ```text
//!                      ┌──────────────────────────────┐
//!  events (bounded) ──>│                              │
//!                      │  RegistrationActor           │──> sink
//!  control ──────────> │  select! { biased; ... }     │
//!                      └──────────────┬───────────────┘
//!                                     │ ActorReport (failed update)
//!                                     v
//!                              distribution loop
//! ```
//!
//! ## Inboxes
//!
//! - **Events**: bounded. The distribution loop never waits on a full
//!   inbox; the event is dropped for this registration only.
//! - **Control**: unbounded and polled first, so an update or a termination
//!   always takes effect before any event queued behind it.
//!
//! ## Update Semantics
//!
//! An update rebuilds the pipeline completely before installing it. If the
//! rebuild fails the actor reports the rejected snapshot and exits; it never
//! keeps running the previous pipeline. Updates queued behind the failed one
//! are lost with the actor, so the registry decides from the report whether
//! a newer snapshot needs a fresh actor.

use std::sync::Arc;

use export_telemetry::{metric_inc, ACTIVE_REGISTRATIONS, EVENTS_FILTERED, PIPELINE_FAILURES, SENDS};
use export_types::{Event, Registration};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::{DistroConfig, SenderConfig};
use crate::domain::PipelineError;
use crate::pipeline::{build, Delivery, Pipeline};

/// Commands sent from the reconciler to an actor.
#[derive(Debug)]
pub enum ControlMessage {
    /// Rebuild the pipeline from a new snapshot.
    Update(Box<Registration>),
    /// Stop without processing queued events.
    Terminate,
}

/// Messages sent from an actor back to the distribution loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorReport {
    /// The pipeline could not be rebuilt from `rejected`. The actor has
    /// exited, and any updates still queued behind it were never applied.
    UpdateFailed {
        name: String,
        generation: u64,
        rejected: Box<Registration>,
        reason: String,
    },
}

impl ActorReport {
    pub fn name(&self) -> &str {
        match self {
            Self::UpdateFailed { name, .. } => name,
        }
    }

    pub fn generation(&self) -> u64 {
        match self {
            Self::UpdateFailed { generation, .. } => *generation,
        }
    }
}

/// Result of offering an event to an actor's inbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    Queued,
    /// Inbox full; the event is dropped for this registration.
    Dropped,
    /// The actor has exited.
    Closed,
}

/// Registry-side handle to a running actor.
#[derive(Debug)]
pub struct ActorHandle {
    name: String,
    generation: u64,
    snapshot: Registration,
    events: mpsc::Sender<Arc<Event>>,
    control: mpsc::UnboundedSender<ControlMessage>,
    task: JoinHandle<()>,
}

impl ActorHandle {
    /// Start an actor running `pipeline` for `registration`.
    ///
    /// `generation` identifies this incarnation of the name so that reports
    /// from an earlier actor cannot remove a newer one.
    pub fn spawn(
        registration: Registration,
        pipeline: Pipeline,
        generation: u64,
        config: &DistroConfig,
        reports: mpsc::UnboundedSender<ActorReport>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::channel(config.event_inbox_capacity.max(1));
        let (control_tx, control_rx) = mpsc::unbounded_channel();

        let actor = RegistrationActor {
            name: registration.name.clone(),
            generation,
            pipeline,
            sender_config: config.sender.clone(),
            events: events_rx,
            control: control_rx,
            reports,
        };
        let task = tokio::spawn(actor.run());

        Self {
            name: registration.name.clone(),
            generation,
            snapshot: registration,
            events: events_tx,
            control: control_tx,
            task,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Snapshot most recently handed to the actor.
    pub fn snapshot(&self) -> &Registration {
        &self.snapshot
    }

    /// Whether the actor task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Offer an event without waiting.
    pub fn deliver(&self, event: Arc<Event>) -> Enqueue {
        match self.events.try_send(event) {
            Ok(()) => Enqueue::Queued,
            Err(TrySendError::Full(_)) => Enqueue::Dropped,
            Err(TrySendError::Closed(_)) => Enqueue::Closed,
        }
    }

    /// Hand the actor a new snapshot.
    ///
    /// Returns the snapshot back if the actor has already exited.
    pub fn update(&mut self, registration: Registration) -> Result<(), Registration> {
        let message = ControlMessage::Update(Box::new(registration.clone()));
        if self.control.send(message).is_err() {
            return Err(registration);
        }
        self.snapshot = registration;
        Ok(())
    }

    /// Ask the actor to stop. The returned handle completes once it has.
    pub fn terminate(self) -> JoinHandle<()> {
        // An exited actor has nothing left to stop.
        let _ = self.control.send(ControlMessage::Terminate);
        self.task
    }
}

/// Decrements the active gauge however the actor task ends, abort included.
struct ActiveGuard;

impl ActiveGuard {
    fn enter() -> Self {
        ACTIVE_REGISTRATIONS.inc();
        Self
    }
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        ACTIVE_REGISTRATIONS.dec();
    }
}

struct RegistrationActor {
    name: String,
    generation: u64,
    pipeline: Pipeline,
    sender_config: SenderConfig,
    events: mpsc::Receiver<Arc<Event>>,
    control: mpsc::UnboundedReceiver<ControlMessage>,
    reports: mpsc::UnboundedSender<ActorReport>,
}

impl RegistrationActor {
    async fn run(mut self) {
        let _active = ActiveGuard::enter();
        info!(
            registration = %self.name,
            generation = self.generation,
            destination = %self.pipeline.destination(),
            "Registration actor started"
        );

        loop {
            tokio::select! {
                biased; // Control before events

                message = self.control.recv() => match message {
                    Some(ControlMessage::Update(registration)) => {
                        if !self.apply_update(*registration) {
                            break;
                        }
                    }
                    Some(ControlMessage::Terminate) | None => break,
                },

                event = self.events.recv() => match event {
                    Some(event) => self.process(&event).await,
                    None => break,
                },
            }
        }

        info!(registration = %self.name, generation = self.generation, "Registration actor stopped");
    }

    /// Install a pipeline built from `registration`. Returns `false` if the
    /// actor must stop.
    fn apply_update(&mut self, registration: Registration) -> bool {
        match build(&registration, &self.sender_config) {
            Ok(pipeline) => {
                self.pipeline = pipeline;
                info!(
                    registration = %self.name,
                    destination = %self.pipeline.destination(),
                    "Registration updated"
                );
                true
            }
            Err(e) => {
                error!(
                    registration = %self.name,
                    generation = self.generation,
                    error = %e,
                    "Registration update rejected, stopping actor"
                );
                let _ = self.reports.send(ActorReport::UpdateFailed {
                    name: self.name.clone(),
                    generation: self.generation,
                    rejected: Box::new(registration),
                    reason: e.to_string(),
                });
                false
            }
        }
    }

    async fn process(&mut self, event: &Event) {
        let destination = self.pipeline.destination();

        match self.pipeline.process(event).await {
            Ok(Delivery::Filtered) => {
                metric_inc!(EVENTS_FILTERED);
                debug!(registration = %self.name, device = %event.device, "Event filtered");
            }
            Ok(Delivery::Sent { bytes }) => {
                metric_inc!(SENDS, &[destination.tag(), "success"]);
                debug!(registration = %self.name, device = %event.device, bytes, "Event exported");
            }
            Err(e) => {
                if let Some(stage) = e.stage() {
                    metric_inc!(PIPELINE_FAILURES, &[stage.as_str()]);
                }
                if matches!(e, PipelineError::Send { .. }) {
                    metric_inc!(SENDS, &[destination.tag(), "failure"]);
                }
                warn!(
                    registration = %self.name,
                    device = %event.device,
                    error = %e,
                    "Event dropped"
                );
            }
        }
    }
}
