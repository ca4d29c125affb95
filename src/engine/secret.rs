//! Secure copy of secret material (passphrases, SAE passwords).

use std::fmt;

use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::core::{ErrorKind, MAX_KEY_MATERIAL_LEN};

/// Failure to copy secret material.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyMaterialError {
    /// Zero-length secret.
    #[error("key material is empty")]
    Empty,

    /// Secret longer than the engine accepts.
    #[error("key material is {len} bytes, maximum is {max}")]
    TooLong {
        /// Offending length.
        len: usize,
        /// Accepted maximum.
        max: usize,
    },

    /// The destination buffer could not be allocated.
    #[error("failed to allocate {len} bytes for key material")]
    Allocation {
        /// Requested length.
        len: usize,
    },
}

impl KeyMaterialError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::KeyMaterial
    }
}

/// An owned copy of secret bytes.
///
/// The buffer is zeroized on drop. `Debug` never prints the contents.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial {
    bytes: Vec<u8>,
}

impl KeyMaterial {
    /// Copy `secret` into a freshly allocated buffer.
    ///
    /// Allocation failure is reported instead of aborting the process.
    pub fn copy_from(secret: &[u8]) -> Result<Self, KeyMaterialError> {
        if secret.is_empty() {
            return Err(KeyMaterialError::Empty);
        }
        if secret.len() > MAX_KEY_MATERIAL_LEN {
            return Err(KeyMaterialError::TooLong {
                len: secret.len(),
                max: MAX_KEY_MATERIAL_LEN,
            });
        }

        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(secret.len())
            .map_err(|_| KeyMaterialError::Allocation { len: secret.len() })?;
        bytes.extend_from_slice(secret);
        Ok(Self { bytes })
    }

    /// Get the secret bytes.
    ///
    /// # Security
    /// Handle with care - this exposes the secret.
    pub fn expose(&self) -> &[u8] {
        &self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; empty secrets are rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KeyMaterial([REDACTED; {}])", self.bytes.len())
    }
}
