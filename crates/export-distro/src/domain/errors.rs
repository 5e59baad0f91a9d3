//! Error types for the distribution engine

use std::fmt;

use export_types::{Destination, Format, RegistrationError};
use thiserror::Error;

/// Pipeline stage, used to attribute failures in logs and metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Filter,
    Format,
    Compress,
    Encrypt,
    Send,
}

impl Stage {
    /// Metric label for this stage.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filter => "filter",
            Self::Format => "format",
            Self::Compress => "compress",
            Self::Encrypt => "encrypt",
            Self::Send => "send",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised while building or running a registration pipeline.
///
/// Build-time variants (`InvalidRegistration`, `Unsupported`,
/// `Misconfigured`) reject the whole registration. Run-time variants
/// (`Format`, `Transform`, `Send`) abort processing of a single event.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Registration failed structural validation
    #[error("Invalid registration: {0}")]
    InvalidRegistration(#[from] RegistrationError),

    /// No plugin exists for the requested kind
    #[error("Unsupported {stage} kind: {kind}")]
    Unsupported { stage: Stage, kind: String },

    /// A plugin exists but the registration does not give it enough to work with
    #[error("Misconfigured {stage} stage: {reason}")]
    Misconfigured { stage: Stage, reason: String },

    /// Event could not be encoded
    #[error("Failed to format event as {format}: {reason}")]
    Format { format: Format, reason: String },

    /// Compression or encryption failed
    #[error("{stage} transform failed: {reason}")]
    Transform { stage: Stage, reason: String },

    /// Delivery to the sink failed
    #[error("Send to {destination} failed: {reason}")]
    Send {
        destination: Destination,
        reason: String,
    },
}

impl PipelineError {
    /// Stage the error is attributed to, if any.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::InvalidRegistration(_) => None,
            Self::Unsupported { stage, .. }
            | Self::Misconfigured { stage, .. }
            | Self::Transform { stage, .. } => Some(*stage),
            Self::Format { .. } => Some(Stage::Format),
            Self::Send { .. } => Some(Stage::Send),
        }
    }
}

/// Registration store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store could not be reached or read
    #[error("Registration store unavailable: {0}")]
    Unavailable(String),

    /// Store content could not be decoded at all
    #[error("Registration store content is corrupt: {0}")]
    Corrupt(String),
}

/// Fatal errors of the distribution loop
#[derive(Debug, Error)]
pub enum DistroError {
    /// Listing registrations failed
    #[error("Failed to list registrations: {0}")]
    Store(#[from] StoreError),

    /// The event source went away
    #[error("Event source closed")]
    EventSourceClosed,
}
