//! Configuration for the distribution engine

use std::time::Duration;

/// Distribution engine configuration
#[derive(Clone, Debug)]
pub struct DistroConfig {
    /// Capacity of each registration's event inbox. Events arriving at a
    /// full inbox are dropped for that registration only.
    pub event_inbox_capacity: usize,
    /// How long shutdown waits for actors to finish before aborting them
    pub shutdown_timeout: Duration,
    /// Settings handed to every sender the builder creates
    pub sender: SenderConfig,
}

impl Default for DistroConfig {
    fn default() -> Self {
        Self {
            event_inbox_capacity: 64,
            shutdown_timeout: Duration::from_secs(5),
            sender: SenderConfig::default(),
        }
    }
}

/// Sender configuration
#[derive(Clone, Debug)]
pub struct SenderConfig {
    /// Request timeout for REST endpoints
    pub http_timeout: Duration,
    /// MQTT keep-alive interval
    pub mqtt_keep_alive: Duration,
    /// Outgoing request queue of the MQTT client
    pub mqtt_queue_capacity: usize,
    /// Pause between MQTT reconnect attempts
    pub mqtt_reconnect_delay: Duration,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            http_timeout: Duration::from_secs(10),
            mqtt_keep_alive: Duration::from_secs(30),
            mqtt_queue_capacity: 10,
            mqtt_reconnect_delay: Duration::from_secs(1),
        }
    }
}
