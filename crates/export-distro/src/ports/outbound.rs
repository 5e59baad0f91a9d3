//! Outbound Ports (Driven Ports / SPI)

use async_trait::async_trait;
use export_types::Registration;

use crate::domain::StoreError;

/// Read-only view of the registration document store.
///
/// Called once at startup and again after every change notification. The
/// distro never assumes anything about what changed; it always re-reads
/// the full set.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Snapshot of every stored registration, enabled or not.
    async fn list_registrations(&self) -> Result<Vec<Registration>, StoreError>;
}
