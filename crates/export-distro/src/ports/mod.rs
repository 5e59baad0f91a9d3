//! Ports (hexagonal architecture)

pub mod outbound;

pub use outbound::RegistrationStore;

#[cfg(test)]
pub use outbound::mocks;
