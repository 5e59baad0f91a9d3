//! Event formatters.

use export_types::{Event, Format};

use crate::domain::{PipelineError, Stage};

/// Root element name of XML-encoded events.
const XML_ROOT: &str = "Event";

/// Encodes an event into the registration's wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formatter {
    Json,
    Xml,
}

impl Formatter {
    /// Resolve the formatter for a declared format.
    ///
    /// Formats without an implementation resolve to
    /// [`PipelineError::Unsupported`].
    pub fn resolve(format: Format) -> Result<Self, PipelineError> {
        match format {
            Format::Json => Ok(Self::Json),
            Format::Xml => Ok(Self::Xml),
            Format::Serialized | Format::IotCoreJson | Format::AzureJson | Format::Csv => {
                Err(PipelineError::Unsupported {
                    stage: Stage::Format,
                    kind: format.tag().to_string(),
                })
            }
        }
    }

    /// Declared format this formatter implements.
    #[must_use]
    pub fn kind(&self) -> Format {
        match self {
            Self::Json => Format::Json,
            Self::Xml => Format::Xml,
        }
    }

    /// Encode an event.
    pub fn format(&self, event: &Event) -> Result<Vec<u8>, PipelineError> {
        let encoded = match self {
            Self::Json => serde_json::to_vec(event).map_err(|e| e.to_string()),
            Self::Xml => quick_xml::se::to_string_with_root(XML_ROOT, event)
                .map(String::into_bytes)
                .map_err(|e| e.to_string()),
        };
        encoded.map_err(|reason| PipelineError::Format {
            format: self.kind(),
            reason,
        })
    }
}
