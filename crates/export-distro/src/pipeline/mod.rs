//! # Registration Pipelines
//!
//! A pipeline is the resolved, ready-to-run form of one registration:
//!
//! ```text
//! Event ──> [Filter] ──> Formatter ──> [Compress] ──> [Encrypt] ──> Sender ──> sink
//!           optional      required      optional       optional     required
//! ```
//!
//! Every plugin capability is a closed enum resolved from the registration's
//! declared kind. Optional stages that resolve to "none" are absent from the
//! pipeline rather than present as pass-through instances, so no work is
//! done for them.
//!
//! A [`Pipeline`] value can only be obtained from [`build`], which fails
//! unless both the formatter and the sender resolved. An invalid pipeline
//! therefore cannot be installed.

mod builder;
pub mod filter;
pub mod format;
pub mod sender;
pub mod transform;

pub use builder::build;
pub use filter::Filter;
pub use format::Formatter;
pub use sender::{HttpSender, MqttSender, Sender};
pub use transform::{AesEncryption, Transformer};

use export_types::{Destination, Event, Format};

use crate::domain::PipelineError;

/// Outcome of running one event through a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The filter rejected the event; no other stage ran.
    Filtered,
    /// The sender accepted the payload.
    Sent { bytes: usize },
}

/// How often each stage has run since the pipeline was built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub filtered: u64,
    pub formatted: u64,
    pub compressed: u64,
    pub encrypted: u64,
    pub sent: u64,
    pub failed: u64,
}

/// The bound set of plugin instances for one registration.
#[derive(Debug)]
pub struct Pipeline {
    filter: Option<Filter>,
    formatter: Formatter,
    compression: Option<Transformer>,
    encryption: Option<Transformer>,
    sender: Sender,
    stats: PipelineStats,
}

impl Pipeline {
    /// Run one event through every present stage, in order.
    ///
    /// Each stage runs at most once. The first failing stage aborts the
    /// event; the pipeline itself stays usable.
    pub async fn process(&mut self, event: &Event) -> Result<Delivery, PipelineError> {
        let result = self.run_stages(event).await;
        if result.is_err() {
            self.stats.failed += 1;
        }
        result
    }

    async fn run_stages(&mut self, event: &Event) -> Result<Delivery, PipelineError> {
        if let Some(filter) = &self.filter {
            if !filter.apply(event) {
                self.stats.filtered += 1;
                return Ok(Delivery::Filtered);
            }
        }

        let mut data = self.formatter.format(event)?;
        self.stats.formatted += 1;

        if let Some(compression) = &self.compression {
            data = compression.transform(&data)?;
            self.stats.compressed += 1;
        }

        if let Some(encryption) = &self.encryption {
            data = encryption.transform(&data)?;
            self.stats.encrypted += 1;
        }

        let bytes = data.len();
        self.sender.send(data).await?;
        self.stats.sent += 1;

        Ok(Delivery::Sent { bytes })
    }

    pub fn has_filter(&self) -> bool {
        self.filter.is_some()
    }

    pub fn format(&self) -> Format {
        self.formatter.kind()
    }

    pub fn compression(&self) -> Option<&Transformer> {
        self.compression.as_ref()
    }

    pub fn encryption(&self) -> Option<&Transformer> {
        self.encryption.as_ref()
    }

    pub fn destination(&self) -> Destination {
        self.sender.destination()
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }
}
