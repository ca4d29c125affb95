//! Connection controller errors.
//!
//! These reject a request synchronously. Failures after a request has been
//! accepted are reported as a [`ConnectionOutcome`](super::ConnectionOutcome)
//! instead, never both.

use thiserror::Error;

use crate::core::{DeviceId, ErrorKind, SsidError};
use crate::engine::{EngineError, KeyMaterialError};

/// Connection controller errors.
#[derive(Debug, Error)]
pub enum ControlError {
    /// The SSID failed validation.
    #[error("invalid SSID: {0}")]
    Ssid(#[from] SsidError),

    /// Some other request parameter is out of range.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// No engine is registered for the device.
    #[error("device not found: {0}")]
    DeviceNotFound(DeviceId),

    /// The secret could not be copied.
    #[error("key material: {0}")]
    KeyMaterial(#[from] KeyMaterialError),

    /// The engine rejected a call.
    #[error("engine: {0}")]
    Engine(#[from] EngineError),

    /// Controller configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ControlError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ControlError::Ssid(_) | ControlError::InvalidParams(_) | ControlError::Config(_) => {
                ErrorKind::InvalidRequest
            }
            ControlError::DeviceNotFound(_) => ErrorKind::NotFound,
            ControlError::KeyMaterial(e) => e.kind(),
            ControlError::Engine(e) => e.kind(),
        }
    }
}

/// Result type for controller operations.
pub type ControlResult<T> = Result<T, ControlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            ControlError::DeviceNotFound(DeviceId::from("wlan1")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            ControlError::from(KeyMaterialError::Empty).kind(),
            ErrorKind::KeyMaterial
        );
        assert_eq!(
            ControlError::from(SsidError::TooLong { len: 33 }).kind(),
            ErrorKind::InvalidRequest
        );
        assert_eq!(
            ControlError::from(EngineError::Unavailable).kind(),
            ErrorKind::Resource
        );
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ControlError::DeviceNotFound(DeviceId::from("wlan1")).to_string(),
            "device not found: wlan1"
        );
        assert_eq!(
            ControlError::from(SsidError::Empty).to_string(),
            "invalid SSID: SSID is empty"
        );
    }
}
