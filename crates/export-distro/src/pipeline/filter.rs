//! Event filters.

use std::collections::HashSet;

use export_types::{Event, RegistrationFilter};

/// Decides whether an event is exported by a registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    /// Pass only events whose device is in the allow-list.
    DeviceId(HashSet<String>),
}

impl Filter {
    /// Resolve the filter stage for a registration.
    ///
    /// Returns `None` when the registration has no device identifiers, in
    /// which case every event passes and the stage is skipped entirely.
    #[must_use]
    pub fn resolve(filter: &RegistrationFilter) -> Option<Self> {
        if filter.device_identifiers.is_empty() {
            return None;
        }
        Some(Self::DeviceId(
            filter.device_identifiers.iter().cloned().collect(),
        ))
    }

    /// `true` if the event passes.
    #[must_use]
    pub fn apply(&self, event: &Event) -> bool {
        match self {
            Self::DeviceId(devices) => devices.contains(&event.device),
        }
    }
}
