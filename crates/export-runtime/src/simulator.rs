//! Simulated event source.
//!
//! Stands in for the ingestion transport on a bench: emits one synthetic
//! event per interval until the distribution loop goes away.

use std::time::Duration;

use chrono::Utc;
use export_types::{Event, Reading};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Devices the simulator rotates through.
pub const SIMULATED_DEVICES: [&str; 3] = ["sim-device-1", "sim-device-2", "sim-device-3"];

/// Build the `sequence`-th synthetic event.
pub fn simulated_event(sequence: u64) -> Event {
    let now = Utc::now().timestamp_millis();
    let device = SIMULATED_DEVICES[(sequence % SIMULATED_DEVICES.len() as u64) as usize];
    let temperature = 20 + (sequence % 10);

    Event {
        id: Some(format!("sim-{}", sequence)),
        device: device.to_string(),
        origin: now,
        readings: vec![Reading {
            name: "temperature".to_string(),
            value: temperature.to_string(),
            origin: now,
        }],
    }
}

/// Start emitting events every `interval`.
pub fn spawn_simulator(events: mpsc::Sender<Event>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(interval_ms = interval.as_millis() as u64, "Event simulator started");
        let mut ticker = tokio::time::interval(interval);
        let mut sequence = 0u64;

        loop {
            ticker.tick().await;
            let event = simulated_event(sequence);
            debug!(device = %event.device, sequence, "Simulated event");
            if events.send(event).await.is_err() {
                break;
            }
            sequence += 1;
        }

        info!(emitted = sequence, "Event simulator stopped");
    })
}
