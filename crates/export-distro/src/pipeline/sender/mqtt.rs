//! # MQTT Topic Sender
//!
//! The broker connection is opened lazily on the first send, so building a
//! pipeline never needs a runtime or network access. The connection's
//! event loop runs on its own task and is aborted when the sender drops,
//! which happens when the pipeline is replaced or the actor exits.
//!
//! Publishing is a non-blocking enqueue (QoS 1) into the client's request
//! queue. A full queue is reported as a send failure rather than stalling
//! the registration.

use std::fmt;
use std::time::Duration;

use export_types::{Addressable, Destination};
use rumqttc::{AsyncClient, MqttOptions, QoS};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::SenderConfig;
use crate::domain::{PipelineError, Stage};

const ACCEPTED_PROTOCOLS: [&str; 3] = ["", "tcp", "mqtt"];

/// Publishes each payload to one topic.
pub struct MqttSender {
    options: MqttOptions,
    topic: String,
    queue_capacity: usize,
    reconnect_delay: Duration,
    connection: Option<Connection>,
}

/// Live broker connection.
struct Connection {
    client: AsyncClient,
    event_loop: JoinHandle<()>,
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.event_loop.abort();
    }
}

impl MqttSender {
    /// Create a sender for `addressable.topic` on the broker at
    /// `addressable.address:port`. No connection is opened yet.
    pub fn new(addressable: &Addressable, config: &SenderConfig) -> Result<Self, PipelineError> {
        if addressable.address.is_empty() {
            return Err(misconfigured("MQTT broker has no address".to_string()));
        }
        if addressable.topic.is_empty() {
            return Err(misconfigured("MQTT destination has no topic".to_string()));
        }
        let protocol = addressable.protocol.to_lowercase();
        if !ACCEPTED_PROTOCOLS.contains(&protocol.as_str()) {
            return Err(misconfigured(format!(
                "unsupported MQTT protocol {}",
                addressable.protocol
            )));
        }

        let client_id = if addressable.publisher.is_empty() {
            format!("edge-export-{}", uuid::Uuid::new_v4())
        } else {
            addressable.publisher.clone()
        };

        let mut options = MqttOptions::new(client_id, addressable.address.clone(), addressable.port);
        options.set_keep_alive(config.mqtt_keep_alive);
        if !addressable.user.is_empty() {
            options.set_credentials(addressable.user.clone(), addressable.password.clone());
        }

        Ok(Self {
            options,
            topic: addressable.topic.clone(),
            queue_capacity: config.mqtt_queue_capacity,
            reconnect_delay: config.mqtt_reconnect_delay,
            connection: None,
        })
    }

    /// Topic payloads are published to.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Whether the broker connection has been opened.
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Enqueue one payload for publishing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn send(&mut self, payload: Vec<u8>) -> Result<(), PipelineError> {
        let bytes = payload.len();
        let topic = self.topic.clone();
        let connection = self.connect();
        connection
            .client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)
            .map_err(|e| PipelineError::Send {
                destination: Destination::Mqtt,
                reason: e.to_string(),
            })?;

        debug!(topic = %self.topic, bytes, "Payload queued for publishing");
        Ok(())
    }

    fn connect(&mut self) -> &Connection {
        let options = &self.options;
        let queue_capacity = self.queue_capacity;
        let reconnect_delay = self.reconnect_delay;

        self.connection.get_or_insert_with(|| {
            let (host, port) = options.broker_address();
            info!(broker = %host, port, client_id = %options.client_id(), "Opening MQTT connection");

            let (client, mut event_loop) = AsyncClient::new(options.clone(), queue_capacity);
            let event_loop = tokio::spawn(async move {
                loop {
                    if let Err(e) = event_loop.poll().await {
                        warn!(broker = %host, port, error = %e, "MQTT connection error, retrying");
                        tokio::time::sleep(reconnect_delay).await;
                    }
                }
            });

            Connection { client, event_loop }
        })
    }
}

impl fmt::Debug for MqttSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (host, port) = self.options.broker_address();
        f.debug_struct("MqttSender")
            .field("broker", &format_args!("{}:{}", host, port))
            .field("client_id", &self.options.client_id())
            .field("topic", &self.topic)
            .field("connected", &self.is_connected())
            .finish()
    }
}

fn misconfigured(reason: String) -> PipelineError {
    PipelineError::Misconfigured {
        stage: Stage::Send,
        reason,
    }
}
