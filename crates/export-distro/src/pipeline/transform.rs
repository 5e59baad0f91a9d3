//! # Payload Transformers
//!
//! Compression and encryption share one contract: bytes in, bytes out.
//!
//! ## AES
//!
//! AES-256-GCM. The cipher key is the SHA-256 digest of the registration's
//! key string, so any key length is accepted. Every message gets a fresh
//! random 96-bit nonce:
//!
//! ```text
//! +----------------+------------------------------+
//! | nonce (12 B)   | ciphertext + GCM tag (16 B)  |
//! +----------------+------------------------------+
//! ```
//!
//! The registration's initialization vector, when set, is bound as
//! associated data; receivers must supply the same value to decrypt.

use std::fmt;
use std::io::Write;

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use export_types::{Compression, EncryptionAlgorithm, EncryptionDetails};
use flate2::write::{GzEncoder, ZlibEncoder};
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

use crate::domain::{PipelineError, Stage};

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// Cipher key derived from a registration's key string.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretKey([u8; 32]);

impl SecretKey {
    /// Derive the key as SHA-256 of `secret`.
    pub fn derive(secret: &str) -> Self {
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&Sha256::digest(secret.as_bytes()));
        Self(bytes)
    }

    /// Get inner bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(..)")
    }
}

/// AES-256-GCM encryption stage.
#[derive(Clone, Debug)]
pub struct AesEncryption {
    key: SecretKey,
    associated_data: Vec<u8>,
}

impl AesEncryption {
    pub fn new(details: &EncryptionDetails) -> Self {
        Self {
            key: SecretKey::derive(&details.key),
            associated_data: details.init_vector.as_bytes().to_vec(),
        }
    }

    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, PipelineError> {
        let cipher = Aes256Gcm::new(self.key.as_bytes().into());

        let mut nonce = [0u8; NONCE_LEN];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut nonce);

        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&nonce),
                Payload {
                    msg: plaintext,
                    aad: &self.associated_data,
                },
            )
            .map_err(|e| PipelineError::Transform {
                stage: Stage::Encrypt,
                reason: e.to_string(),
            })?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }
}

/// A bytes-to-bytes pipeline stage.
#[derive(Clone, Debug)]
pub enum Transformer {
    /// Gzip container, default level
    Gzip,
    /// Zlib stream, default level (the `ZIP` compression kind)
    Zlib,
    /// AES-256-GCM
    Aes(AesEncryption),
}

impl Transformer {
    /// Resolve the compression stage. `NONE` resolves to no stage at all.
    #[must_use]
    pub fn compression(kind: Compression) -> Option<Self> {
        match kind {
            Compression::None => None,
            Compression::Gzip => Some(Self::Gzip),
            Compression::Zip => Some(Self::Zlib),
        }
    }

    /// Resolve the encryption stage. `NONE` resolves to no stage at all.
    #[must_use]
    pub fn encryption(details: &EncryptionDetails) -> Option<Self> {
        match details.algorithm {
            EncryptionAlgorithm::None => None,
            EncryptionAlgorithm::Aes => Some(Self::Aes(AesEncryption::new(details))),
        }
    }

    /// Stage this transformer runs in.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Gzip | Self::Zlib => Stage::Compress,
            Self::Aes(_) => Stage::Encrypt,
        }
    }

    pub fn transform(&self, data: &[u8]) -> Result<Vec<u8>, PipelineError> {
        match self {
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data).map_err(|e| self.failure(e))?;
                encoder.finish().map_err(|e| self.failure(e))
            }
            Self::Zlib => {
                let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
                encoder.write_all(data).map_err(|e| self.failure(e))?;
                encoder.finish().map_err(|e| self.failure(e))
            }
            Self::Aes(aes) => aes.encrypt(data),
        }
    }

    fn failure(&self, error: std::io::Error) -> PipelineError {
        PipelineError::Transform {
            stage: self.stage(),
            reason: error.to_string(),
        }
    }
}
