//! # Telemetry Entities
//!
//! Events as produced by the edge platform. The core treats them as opaque
//! beyond the device identifier (filtering) and serde (formatting).

use serde::{Deserialize, Serialize};

/// A single sensor reading carried by an [`Event`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    /// Value descriptor name (e.g. `temperature`).
    pub name: String,
    /// Reading value, always transported as text.
    pub value: String,
    /// Device-side timestamp in milliseconds.
    #[serde(default)]
    pub origin: i64,
}

impl Reading {
    /// Create a reading without an origin timestamp.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            origin: 0,
        }
    }
}

/// A telemetry event emitted by one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Identifier assigned by the platform, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Identifier of the device that produced the event.
    pub device: String,
    /// Device-side timestamp in milliseconds.
    #[serde(default)]
    pub origin: i64,
    /// Readings carried by this event.
    #[serde(default)]
    pub readings: Vec<Reading>,
}

impl Event {
    /// Create an event for a device with no readings.
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    /// Builder-style helper that appends a reading.
    #[must_use]
    pub fn with_reading(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.readings.push(Reading::new(name, value));
        self
    }

    /// Builder-style helper that sets the origin timestamp.
    #[must_use]
    pub fn with_origin(mut self, origin: i64) -> Self {
        self.origin = origin;
        self
    }
}
