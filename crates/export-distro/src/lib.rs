//! # Export Distro
//!
//! Registration execution engine. Keeps one long-lived pipeline per active
//! export registration, reconciles the running set against the registration
//! store on every change, and fans each incoming event out to all of them.
//!
//! ## Architecture
//!
//! - **Domain**: Pipeline stages and error types
//! - **Pipeline**: Plugin capabilities (filter, formatter, transformer,
//!   sender) and the pure pipeline builder
//! - **Application**: Registration actors, the reconciler that owns the
//!   actor registry, and the distribution loop
//! - **Ports**: Outbound `RegistrationStore`
//! - **Adapters**: In-memory registration store
//!
//! ## Failure Isolation
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Unsupported format or destination | Registration rejected, no actor |
//! | Update that no longer builds | Actor exits and is removed |
//! | Malformed event, transform or send failure | Event dropped for that registration |
//! | Full actor inbox | Event dropped for that registration |
//! | Store failure, event source closed | Loop drains all actors and returns an error |
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use export_distro::{DistributionLoop, DistroConfig, DistroSignals, InMemoryRegistrationStore};
//!
//! let store = Arc::new(InMemoryRegistrationStore::new());
//! let (handle, signals) = DistroSignals::channel(1024);
//! let distro = tokio::spawn(DistributionLoop::new(store, DistroConfig::default()).run(signals));
//!
//! handle.events.send(event).await?;
//! handle.changes.notify();
//! handle.shutdown.send(ShutdownReason::Interrupted)?;
//! let exit = distro.await??;
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use adapters::InMemoryRegistrationStore;
pub use application::{
    ActorHandle, ActorReport, ChangeNotifier, DistributionLoop, DistroHandle, DistroSignals,
    FanOut, LoopExit, ReconcileSummary, Reconciler, RegistrationsChanged, ShutdownReason,
};
pub use config::{DistroConfig, SenderConfig};
pub use domain::{DistroError, PipelineError, Stage, StoreError};
pub use pipeline::{build, Delivery, Pipeline, PipelineStats};
pub use ports::RegistrationStore;
