//! Error types shared by every layer.

use std::fmt;

use thiserror::Error;

/// Coarse error taxonomy used to decide how a failure is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Endpoint or interface could not be opened/bound. Fatal to the
    /// operation, never retried automatically.
    Resource,
    /// Unknown interface or device.
    NotFound,
    /// Secret material could not be copied.
    KeyMaterial,
    /// An operation did not complete within its budget.
    Timeout,
    /// A frame could not be sent or received.
    Transport,
    /// The request itself was malformed.
    InvalidRequest,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Resource => "resource",
            ErrorKind::NotFound => "not found",
            ErrorKind::KeyMaterial => "key material",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Transport => "transport",
            ErrorKind::InvalidRequest => "invalid request",
        };
        f.write_str(name)
    }
}

/// SSID validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SsidError {
    /// Zero-length SSID.
    #[error("SSID is empty")]
    Empty,

    /// SSID longer than 32 bytes.
    #[error("SSID is {len} bytes, maximum is 32")]
    TooLong {
        /// Offending length.
        len: usize,
    },
}

/// Malformed textual hardware address.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid hardware address: {0:?}")]
pub struct AddrParseError(pub String);

/// Top-level error returned by the request surface.
#[derive(Debug, Error)]
pub enum SupplicantError {
    /// Frame transport error.
    #[cfg(feature = "transport")]
    #[error("transport: {0}")]
    Transport(#[from] crate::transport::TransportError),

    /// Connection controller error.
    #[cfg(feature = "control")]
    #[error("control: {0}")]
    Control(#[from] crate::control::ControlError),
}

impl SupplicantError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match *self {
            #[cfg(feature = "transport")]
            SupplicantError::Transport(ref e) => e.kind(),
            #[cfg(feature = "control")]
            SupplicantError::Control(ref e) => e.kind(),
        }
    }
}

/// Result type for the request surface.
pub type SupplicantResult<T> = Result<T, SupplicantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "not found");
        assert_eq!(ErrorKind::KeyMaterial.to_string(), "key material");
    }

    #[test]
    fn test_ssid_error_messages() {
        assert_eq!(SsidError::Empty.to_string(), "SSID is empty");
        assert_eq!(
            SsidError::TooLong { len: 33 }.to_string(),
            "SSID is 33 bytes, maximum is 32"
        );
    }
}
