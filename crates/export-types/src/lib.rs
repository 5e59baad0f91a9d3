//! # Export Types Crate
//!
//! This crate contains the registration record and the telemetry event
//! types exchanged between the registration store, the event source and the
//! distro core.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: The registration document format is defined here.
//! - **Immutable Snapshots**: A `Registration` is a value handed to the core;
//!   the core never writes it back to the store.
//! - **Closed Plugin Set**: Every format, compression, encryption and
//!   destination kind is a variant of a closed enum.

pub mod entities;
pub mod errors;
pub mod registration;

pub use entities::*;
pub use errors::*;
pub use registration::*;
