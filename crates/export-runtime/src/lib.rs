//! # Export Runtime
//!
//! Process shell around the export distro: configuration from the
//! environment, the JSON file registration store, the HTTP control surface,
//! the event simulator and the shutdown plumbing.
//!
//! ## Modules
//!
//! - `config` - `RuntimeConfig` from `EXPORT_DISTRO_*` variables
//! - `adapters` - `JsonFileRegistrationStore`
//! - `http` - axum control surface
//! - `simulator` - synthetic event source
//! - `runtime` - wiring and shutdown sequence

pub mod adapters;
pub mod config;
pub mod http;
pub mod runtime;
pub mod simulator;

pub use adapters::JsonFileRegistrationStore;
pub use config::{RuntimeConfig, RuntimeConfigError};
pub use http::{router, AppState};
pub use runtime::{shutdown_signal, ExportRuntime};
pub use simulator::{simulated_event, spawn_simulator};
