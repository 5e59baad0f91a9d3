//! Domain layer: pipeline stages and error types

pub mod errors;

pub use errors::{DistroError, PipelineError, Stage, StoreError};
