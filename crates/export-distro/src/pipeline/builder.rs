//! Pipeline builder.
//!
//! Maps a registration snapshot to a [`Pipeline`]. Pure: no I/O, no
//! runtime, and every resolution is independent of the others.

use export_types::Registration;
use tracing::debug;

use super::{Filter, Formatter, Pipeline, PipelineStats, Sender, Transformer};
use crate::config::SenderConfig;
use crate::domain::PipelineError;

/// Build the pipeline for a registration.
///
/// Fails if the snapshot is structurally invalid or if its format or
/// destination has no implementation. Compression, encryption and filter
/// are optional and never cause a failure.
pub fn build(registration: &Registration, config: &SenderConfig) -> Result<Pipeline, PipelineError> {
    registration.validate()?;

    let formatter = Formatter::resolve(registration.format)?;
    let sender = Sender::resolve(registration.destination, &registration.addressable, config)?;
    let compression = Transformer::compression(registration.compression);
    let encryption = Transformer::encryption(&registration.encryption);
    let filter = Filter::resolve(&registration.filter);

    debug!(
        registration = %registration.name,
        format = %registration.format,
        compression = %registration.compression,
        encryption = %registration.encryption.algorithm,
        destination = %registration.destination,
        filtered = filter.is_some(),
        "Pipeline built"
    );

    Ok(Pipeline {
        filter,
        formatter,
        compression,
        encryption,
        sender,
        stats: PipelineStats::default(),
    })
}
