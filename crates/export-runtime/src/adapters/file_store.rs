//! # JSON File Registration Store
//!
//! Reads registration documents from a JSON array on disk. The file is
//! re-read on every listing, so editing it and sending a change
//! notification is enough to reconfigure the distro.
//!
//! - A missing file is an empty registration set.
//! - A file that is not a JSON array is a store failure.
//! - Individual documents that do not decode are skipped and logged; one
//!   bad document does not hide the others.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use export_distro::{RegistrationStore, StoreError};
use export_types::Registration;
use tracing::{debug, warn};

/// Registration store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileRegistrationStore {
    path: PathBuf,
}

impl JsonFileRegistrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl RegistrationStore for JsonFileRegistrationStore {
    async fn list_registrations(&self) -> Result<Vec<Registration>, StoreError> {
        let contents = match tokio::fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "Registration file not found, no registrations");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(StoreError::Unavailable(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        let documents: Vec<serde_json::Value> = serde_json::from_slice(&contents)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))?;

        let mut registrations = Vec::with_capacity(documents.len());
        for (index, document) in documents.into_iter().enumerate() {
            match serde_json::from_value::<Registration>(document) {
                Ok(registration) => registrations.push(registration),
                Err(e) => warn!(
                    path = %self.path.display(),
                    index,
                    error = %e,
                    "Skipping malformed registration document"
                ),
            }
        }

        Ok(registrations)
    }
}
