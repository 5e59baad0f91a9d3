//! # Error Types
//!
//! Errors shared between the store adapters and the distro core.

use thiserror::Error;

/// A registration snapshot that cannot be used as given.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistrationError {
    /// Registration name is empty or whitespace.
    #[error("Registration name must not be empty")]
    EmptyName,

    /// AES selected without a key to derive the cipher key from.
    #[error("Registration {name}: AES encryption requires an encryption key")]
    MissingEncryptionKey { name: String },
}
