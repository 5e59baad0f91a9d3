//! In-memory registration store.
//!
//! Backs embedded deployments and tests. Registrations are keyed by name;
//! saving a registration with an existing name replaces it in place.

use async_trait::async_trait;
use export_types::Registration;
use parking_lot::RwLock;

use crate::domain::StoreError;
use crate::ports::RegistrationStore;

/// Registration store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRegistrationStore {
    registrations: RwLock<Vec<Registration>>,
}

impl InMemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `registrations`.
    pub fn with_registrations(registrations: impl IntoIterator<Item = Registration>) -> Self {
        let store = Self::new();
        for registration in registrations {
            store.save(registration);
        }
        store
    }

    /// Insert or replace a registration by name.
    pub fn save(&self, registration: Registration) {
        let mut registrations = self.registrations.write();
        match registrations
            .iter_mut()
            .find(|existing| existing.name == registration.name)
        {
            Some(existing) => *existing = registration,
            None => registrations.push(registration),
        }
    }

    /// Remove a registration by name. Returns whether it existed.
    pub fn delete(&self, name: &str) -> bool {
        let mut registrations = self.registrations.write();
        let before = registrations.len();
        registrations.retain(|registration| registration.name != name);
        registrations.len() != before
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }
}

#[async_trait]
impl RegistrationStore for InMemoryRegistrationStore {
    async fn list_registrations(&self) -> Result<Vec<Registration>, StoreError> {
        Ok(self.registrations.read().clone())
    }
}
