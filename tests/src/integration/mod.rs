//! Cross-crate end-to-end scenarios

pub mod e2e_distribution;
pub mod e2e_runtime;
