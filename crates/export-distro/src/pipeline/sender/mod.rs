//! # Senders
//!
//! Deliver a finished payload to a sink. A sender never retries; a failed
//! send drops that one event and the registration keeps running.
//!
//! | Destination     | Sender                 |
//! |-----------------|------------------------|
//! | `REST_ENDPOINT` | [`HttpSender`]         |
//! | `MQTT_TOPIC`    | [`MqttSender`]         |
//! | `ZMQ_TOPIC`     | unsupported            |
//! | `IOTCORE_MQTT`  | unsupported            |
//! | `AZURE_MQTT`    | unsupported            |

mod http;
mod mqtt;

pub use http::HttpSender;
pub use mqtt::MqttSender;

use export_types::{Addressable, Destination};

use crate::config::SenderConfig;
use crate::domain::{PipelineError, Stage};

/// Delivers payloads to one sink.
#[derive(Debug)]
pub enum Sender {
    Http(HttpSender),
    Mqtt(MqttSender),
}

impl Sender {
    /// Resolve the sender for a destination kind.
    pub fn resolve(
        destination: Destination,
        addressable: &Addressable,
        config: &SenderConfig,
    ) -> Result<Self, PipelineError> {
        match destination {
            Destination::Rest => HttpSender::new(addressable, config).map(Self::Http),
            Destination::Mqtt => MqttSender::new(addressable, config).map(Self::Mqtt),
            Destination::Zmq | Destination::IotCoreMqtt | Destination::AzureMqtt => {
                Err(PipelineError::Unsupported {
                    stage: Stage::Send,
                    kind: destination.tag().to_string(),
                })
            }
        }
    }

    /// Destination kind this sender delivers to.
    #[must_use]
    pub fn destination(&self) -> Destination {
        match self {
            Self::Http(_) => Destination::Rest,
            Self::Mqtt(_) => Destination::Mqtt,
        }
    }

    pub async fn send(&mut self, payload: Vec<u8>) -> Result<(), PipelineError> {
        match self {
            Self::Http(sender) => sender.send(payload).await,
            Self::Mqtt(sender) => sender.send(payload),
        }
    }
}
