//! # Reconciler
//!
//! Aligns the running actors with the desired registration set. Owns the
//! actor registry; it is driven only from the distribution loop's task, so
//! the registry needs no lock.
//!
//! ## Pass Order
//!
//! 1. Drop disabled registrations and later duplicates of a name.
//! 2. Terminate actors whose name is no longer desired.
//! 3. For names with a running actor: skip unchanged snapshots, send the
//!    rest as updates. If the actor has already exited, replace it.
//! 4. For new names: build the pipeline here and spawn an actor only if the
//!    build succeeds.
//!
//! Updates are not validated here. The actor rebuilds its own pipeline and
//! reports a failure back, after which [`Reconciler::handle_report`] removes
//! it. A snapshot queued behind the rejected one dies with the actor, so it
//! is rebuilt from the registry entry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use export_telemetry::{metric_inc, EVENTS_DELIVERED, EVENTS_DROPPED, RECONCILE_ACTIONS};
use export_types::{Event, Registration};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::actor::{ActorHandle, ActorReport, Enqueue};
use crate::config::DistroConfig;
use crate::pipeline::build;

/// What one reconciliation pass did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    pub terminated: usize,
    pub rejected: usize,
}

impl ReconcileSummary {
    /// `true` if no actor was created, updated or terminated.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.terminated == 0
    }
}

/// What one event fan-out did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FanOut {
    pub delivered: usize,
    pub dropped: usize,
}

/// Owner of the actor registry.
pub struct Reconciler {
    actors: HashMap<String, ActorHandle>,
    config: DistroConfig,
    reports: mpsc::UnboundedSender<ActorReport>,
    next_generation: u64,
}

impl Reconciler {
    /// Create an empty registry. Actors send their reports to `reports`.
    pub fn new(config: DistroConfig, reports: mpsc::UnboundedSender<ActorReport>) -> Self {
        Self {
            actors: HashMap::new(),
            config,
            reports,
            next_generation: 1,
        }
    }

    /// Align the registry with `desired`.
    ///
    /// Must be called from within a Tokio runtime; new actors are spawned
    /// onto it.
    pub fn reconcile(&mut self, desired: Vec<Registration>) -> ReconcileSummary {
        let desired = Self::desired_set(desired);
        let mut summary = ReconcileSummary::default();

        let wanted: HashSet<&str> = desired.iter().map(|r| r.name.as_str()).collect();
        let stale: Vec<String> = self
            .actors
            .keys()
            .filter(|name| !wanted.contains(name.as_str()))
            .cloned()
            .collect();

        for name in stale {
            if let Some(actor) = self.actors.remove(&name) {
                info!(registration = %name, "Registration removed, terminating actor");
                actor.terminate();
                metric_inc!(RECONCILE_ACTIONS, &["terminated"]);
                summary.terminated += 1;
            }
        }

        for registration in desired {
            match self.actors.get_mut(&registration.name) {
                Some(actor) if actor.snapshot() == &registration => {
                    summary.unchanged += 1;
                }
                Some(actor) => match actor.update(registration) {
                    Ok(()) => {
                        debug!(registration = %actor.name(), "Update sent to actor");
                        metric_inc!(RECONCILE_ACTIONS, &["updated"]);
                        summary.updated += 1;
                    }
                    Err(registration) => {
                        warn!(
                            registration = %registration.name,
                            "Actor exited before update, rebuilding"
                        );
                        self.actors.remove(&registration.name);
                        self.create(registration, &mut summary);
                    }
                },
                None => self.create(registration, &mut summary),
            }
        }

        info!(
            created = summary.created,
            updated = summary.updated,
            unchanged = summary.unchanged,
            terminated = summary.terminated,
            rejected = summary.rejected,
            active = self.actors.len(),
            "Reconciliation complete"
        );
        summary
    }

    /// Enabled registrations, first occurrence of each name only.
    fn desired_set(desired: Vec<Registration>) -> Vec<Registration> {
        let mut seen = HashSet::new();
        desired
            .into_iter()
            .filter(|registration| {
                if !registration.enable {
                    debug!(registration = %registration.name, "Skipping disabled registration");
                    return false;
                }
                if !seen.insert(registration.name.clone()) {
                    warn!(registration = %registration.name, "Duplicate registration name ignored");
                    return false;
                }
                true
            })
            .collect()
    }

    fn create(&mut self, registration: Registration, summary: &mut ReconcileSummary) {
        match build(&registration, &self.config.sender) {
            Ok(pipeline) => {
                let generation = self.next_generation;
                self.next_generation += 1;

                let name = registration.name.clone();
                let actor = ActorHandle::spawn(
                    registration,
                    pipeline,
                    generation,
                    &self.config,
                    self.reports.clone(),
                );
                self.actors.insert(name, actor);
                metric_inc!(RECONCILE_ACTIONS, &["created"]);
                summary.created += 1;
            }
            Err(e) => {
                warn!(
                    registration = %registration.name,
                    error = %e,
                    "Registration not supported, no actor created"
                );
                metric_inc!(RECONCILE_ACTIONS, &["rejected"]);
                summary.rejected += 1;
            }
        }
    }

    /// Apply an actor report. Returns whether the registry changed.
    ///
    /// Reports from an earlier incarnation of a name are ignored. The failed
    /// actor is removed; if a newer snapshot was handed to it after the one
    /// it rejected, that snapshot gets a fresh actor.
    pub fn handle_report(&mut self, report: ActorReport) -> bool {
        let current = self
            .actors
            .get(report.name())
            .map(ActorHandle::generation);

        if current != Some(report.generation()) {
            debug!(
                registration = %report.name(),
                generation = report.generation(),
                "Ignoring report from a replaced actor"
            );
            return false;
        }

        let ActorReport::UpdateFailed {
            name,
            rejected,
            reason,
            ..
        } = report;
        let Some(actor) = self.actors.remove(&name) else {
            return false;
        };
        warn!(registration = %name, reason = %reason, "Removing actor after failed update");
        metric_inc!(RECONCILE_ACTIONS, &["removed"]);

        if actor.snapshot() != rejected.as_ref() {
            info!(registration = %name, "Newer snapshot pending, rebuilding actor");
            let latest = actor.snapshot().clone();
            let mut summary = ReconcileSummary::default();
            self.create(latest, &mut summary);
        }
        true
    }

    /// Offer an event to every actor without waiting on any of them.
    pub fn distribute(&self, event: Arc<Event>) -> FanOut {
        let mut fan_out = FanOut::default();

        for actor in self.actors.values() {
            match actor.deliver(Arc::clone(&event)) {
                Enqueue::Queued => {
                    metric_inc!(EVENTS_DELIVERED);
                    fan_out.delivered += 1;
                }
                Enqueue::Dropped => {
                    metric_inc!(EVENTS_DROPPED, &[actor.name()]);
                    warn!(registration = %actor.name(), device = %event.device, "Inbox full, event dropped");
                    fan_out.dropped += 1;
                }
                Enqueue::Closed => {
                    metric_inc!(EVENTS_DROPPED, &[actor.name()]);
                    debug!(registration = %actor.name(), "Actor exited, event dropped");
                    fan_out.dropped += 1;
                }
            }
        }

        fan_out
    }

    /// Terminate every actor and wait up to `timeout` for them to stop;
    /// stragglers are aborted. Returns how many actors were stopped.
    pub async fn shutdown(&mut self, timeout: Duration) -> usize {
        let tasks: Vec<_> = self
            .actors
            .drain()
            .map(|(name, actor)| (name, actor.terminate()))
            .collect();
        let count = tasks.len();
        let deadline = tokio::time::Instant::now() + timeout;

        for (name, mut task) in tasks {
            if tokio::time::timeout_at(deadline, &mut task).await.is_err() {
                warn!(registration = %name, "Actor did not stop in time, aborting");
                task.abort();
            }
        }

        info!(stopped = count, "All registration actors stopped");
        count
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actors.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.actors.keys().cloned().collect();
        names.sort();
        names
    }

    /// Generation of the actor currently registered under `name`.
    pub fn generation_of(&self, name: &str) -> Option<u64> {
        self.actors.get(name).map(ActorHandle::generation)
    }
}
