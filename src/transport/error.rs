//! Frame transport error types.
//!
//! Setup errors (`InterfaceNotFound`, `OpenFailed`, `BindFailed`) are fatal to
//! the open call and never retried here. Per-frame errors are local: receive
//! errors drop the frame, send errors go back to the caller of `send`.

use std::io;

use thiserror::Error;

use crate::core::{ErrorKind, IfIndex};

use super::stack::EndpointId;

/// Frame transport errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Interface name is empty or too long.
    #[error("invalid interface name: {0:?}")]
    InvalidInterfaceName(String),

    /// No interface with this name exists.
    #[error("interface not found: {0}")]
    InterfaceNotFound(String),

    /// The packet endpoint could not be created.
    #[error("failed to open packet endpoint on {ifname} (protocol {protocol:#06x}): {source}")]
    OpenFailed {
        /// Interface name.
        ifname: String,
        /// Protocol filter.
        protocol: u16,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// The endpoint could not be bound to the interface/protocol.
    #[error("failed to bind packet endpoint to {ifname} (ifindex {ifindex}): {source}")]
    BindFailed {
        /// Interface name.
        ifname: String,
        /// Resolved interface index.
        ifindex: IfIndex,
        /// Underlying cause.
        #[source]
        source: io::Error,
    },

    /// A frame could not be written.
    #[error("send failed: {0}")]
    SendFailed(#[source] io::Error),

    /// A frame could not be read.
    #[error("receive failed: {0}")]
    RecvFailed(#[source] io::Error),

    /// A packet filter could not be installed.
    #[error("failed to install packet filter: {0}")]
    FilterFailed(#[source] io::Error),

    /// The binding has already been closed.
    #[error("binding is closed")]
    Closed,

    /// The endpoint is already registered with the event loop.
    #[error("endpoint {0} is already registered")]
    AlreadyRegistered(EndpointId),

    /// The event loop has shut down.
    #[error("event loop has shut down")]
    EventLoopClosed,
}

impl TransportError {
    /// Check if this error is fatal to the operation that produced it
    /// (as opposed to a single dropped frame).
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            TransportError::SendFailed(_) | TransportError::RecvFailed(_)
        )
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransportError::InvalidInterfaceName(_) => ErrorKind::InvalidRequest,
            TransportError::InterfaceNotFound(_) => ErrorKind::NotFound,
            TransportError::OpenFailed { .. }
            | TransportError::BindFailed { .. }
            | TransportError::FilterFailed(_)
            | TransportError::Closed
            | TransportError::AlreadyRegistered(_)
            | TransportError::EventLoopClosed => ErrorKind::Resource,
            TransportError::SendFailed(_) | TransportError::RecvFailed(_) => ErrorKind::Transport,
        }
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
