//! # Registration Record
//!
//! An export profile: which events to export, how to encode them and where
//! to deliver them. Registrations live in an external document store keyed
//! by `name`; the distro core only ever reads snapshots of them.
//!
//! ## Document Format
//!
//! ```json
//! {
//!   "name": "r1",
//!   "format": "JSON",
//!   "compression": "GZIP",
//!   "encryption": { "encryptionAlgorithm": "AES", "encryptionKey": "secret" },
//!   "destination": "REST_ENDPOINT",
//!   "addressable": { "protocol": "http", "address": "10.0.0.2", "port": 8080, "path": "/ingest" },
//!   "filter": { "deviceIdentifiers": ["d1", "d2"] }
//! }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::RegistrationError;

/// Output encoding of exported events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Format {
    #[serde(rename = "JSON")]
    Json,
    #[serde(rename = "XML")]
    Xml,
    #[serde(rename = "SERIALIZED")]
    Serialized,
    #[serde(rename = "IOTCORE_JSON")]
    IotCoreJson,
    #[serde(rename = "AZURE_JSON")]
    AzureJson,
    #[serde(rename = "CSV")]
    Csv,
}

impl Format {
    /// Every declared format, supported or not.
    pub const ALL: [Format; 6] = [
        Self::Json,
        Self::Xml,
        Self::Serialized,
        Self::IotCoreJson,
        Self::AzureJson,
        Self::Csv,
    ];

    /// Tag used in registration documents.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::Xml => "XML",
            Self::Serialized => "SERIALIZED",
            Self::IotCoreJson => "IOTCORE_JSON",
            Self::AzureJson => "AZURE_JSON",
            Self::Csv => "CSV",
        }
    }
}

/// Compression applied after formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Compression {
    #[default]
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "GZIP")]
    Gzip,
    #[serde(rename = "ZIP")]
    Zip,
}

impl Compression {
    /// Every declared compression kind.
    pub const ALL: [Compression; 3] = [Self::None, Self::Gzip, Self::Zip];

    /// Tag used in registration documents.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Gzip => "GZIP",
            Self::Zip => "ZIP",
        }
    }
}

/// Encryption algorithm applied after compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum EncryptionAlgorithm {
    #[default]
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "AES")]
    Aes,
}

impl EncryptionAlgorithm {
    /// Every declared encryption algorithm.
    pub const ALL: [EncryptionAlgorithm; 2] = [Self::None, Self::Aes];

    /// Tag used in registration documents.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Aes => "AES",
        }
    }
}

/// Kind of sink a registration delivers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    #[serde(rename = "MQTT_TOPIC")]
    Mqtt,
    #[serde(rename = "ZMQ_TOPIC")]
    Zmq,
    #[serde(rename = "IOTCORE_MQTT")]
    IotCoreMqtt,
    #[serde(rename = "AZURE_MQTT")]
    AzureMqtt,
    #[serde(rename = "REST_ENDPOINT")]
    Rest,
}

impl Destination {
    /// Every declared destination, supported or not.
    pub const ALL: [Destination; 5] = [
        Self::Mqtt,
        Self::Zmq,
        Self::IotCoreMqtt,
        Self::AzureMqtt,
        Self::Rest,
    ];

    /// Tag used in registration documents.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Mqtt => "MQTT_TOPIC",
            Self::Zmq => "ZMQ_TOPIC",
            Self::IotCoreMqtt => "IOTCORE_MQTT",
            Self::AzureMqtt => "AZURE_MQTT",
            Self::Rest => "REST_ENDPOINT",
        }
    }
}

macro_rules! display_tag {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.tag())
                }
            }
        )*
    };
}

display_tag!(Format, Compression, EncryptionAlgorithm, Destination);

/// Encryption settings of a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EncryptionDetails {
    /// Selected algorithm.
    #[serde(rename = "encryptionAlgorithm", default)]
    pub algorithm: EncryptionAlgorithm,
    /// Secret the cipher key is derived from.
    #[serde(rename = "encryptionKey", default)]
    pub key: String,
    /// Optional initialization vector, bound as associated data.
    #[serde(rename = "initializingVector", default)]
    pub init_vector: String,
}

/// Connection information of a sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Addressable {
    pub name: String,
    /// `http`, `https` or `tcp`.
    pub protocol: String,
    /// HTTP method for REST endpoints.
    pub method: String,
    pub address: String,
    pub port: u16,
    pub path: String,
    /// MQTT client identifier.
    pub publisher: String,
    pub user: String,
    pub password: String,
    /// MQTT topic.
    pub topic: String,
}

impl Addressable {
    /// Build the target URL for HTTP destinations.
    ///
    /// The protocol defaults to `http`; the path gets a leading slash if it
    /// lacks one.
    #[must_use]
    pub fn url(&self) -> String {
        let protocol = if self.protocol.is_empty() {
            "http".to_string()
        } else {
            self.protocol.to_lowercase()
        };
        let path = if self.path.is_empty() || self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };
        format!("{}://{}:{}{}", protocol, self.address, self.port, path)
    }
}

/// Which events a registration exports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationFilter {
    /// Allow-list of device identifiers. Empty means every device.
    pub device_identifiers: Vec<String>,
    /// Allow-list of value descriptors. Declared, not applied by the distro.
    pub value_descriptor_identifiers: Vec<String>,
}

fn default_enable() -> bool {
    true
}

/// An export profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    /// Store-assigned document identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Unique registration name; key of the actor registry.
    pub name: String,
    pub format: Format,
    #[serde(default)]
    pub compression: Compression,
    #[serde(default)]
    pub encryption: EncryptionDetails,
    pub destination: Destination,
    #[serde(default)]
    pub addressable: Addressable,
    #[serde(default)]
    pub filter: RegistrationFilter,
    /// Disabled registrations are kept in the store but not exported to.
    #[serde(default = "default_enable")]
    pub enable: bool,
}

impl Registration {
    /// Create an enabled registration with no compression, encryption or filter.
    pub fn new(name: impl Into<String>, format: Format, destination: Destination) -> Self {
        Self {
            id: None,
            name: name.into(),
            format,
            compression: Compression::None,
            encryption: EncryptionDetails::default(),
            destination,
            addressable: Addressable::default(),
            filter: RegistrationFilter::default(),
            enable: true,
        }
    }

    #[must_use]
    pub fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    #[must_use]
    pub fn with_encryption(mut self, encryption: EncryptionDetails) -> Self {
        self.encryption = encryption;
        self
    }

    #[must_use]
    pub fn with_addressable(mut self, addressable: Addressable) -> Self {
        self.addressable = addressable;
        self
    }

    #[must_use]
    pub fn with_device_filter<I, S>(mut self, devices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter.device_identifiers = devices.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enable = false;
        self
    }

    /// Structural checks that do not depend on plugin availability.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.name.trim().is_empty() {
            return Err(RegistrationError::EmptyName);
        }
        if self.encryption.algorithm == EncryptionAlgorithm::Aes && self.encryption.key.is_empty()
        {
            return Err(RegistrationError::MissingEncryptionKey {
                name: self.name.clone(),
            });
        }
        Ok(())
    }
}
