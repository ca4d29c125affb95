//! Event notifications.
//!
//! Every event the subsystem produces is a [`SupplicantEvent`]. They fan out
//! to subscribers through an [`EventBus`]; a subscriber that falls more than
//! the bus capacity behind loses the oldest events.

use std::fmt;

use tokio::sync::broadcast;
use tracing::{debug, trace};

use crate::core::{DeviceId, STATUS_SUCCESS};
use crate::engine::ScanEntry;

use super::operation::{ConnectionOutcome, OperationKind, OutcomeStatus};

/// Discriminant of a [`SupplicantEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A BSS was found.
    ScanResult,
    /// A scan finished.
    ScanDone,
    /// A connect operation finished.
    ConnectResult,
    /// A disconnect operation finished.
    DisconnectResult,
}

/// An event raised by the subsystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupplicantEvent {
    /// A BSS was found.
    ScanResult {
        /// Scanning device.
        device: DeviceId,
        /// The BSS.
        entry: ScanEntry,
    },
    /// A scan finished.
    ScanDone {
        /// Scanning device.
        device: DeviceId,
        /// Engine status, 0 on success.
        status: i32,
    },
    /// A connect operation finished.
    ConnectResult {
        /// Device.
        device: DeviceId,
        /// How it ended.
        status: OutcomeStatus,
    },
    /// A disconnect operation finished.
    DisconnectResult {
        /// Device.
        device: DeviceId,
        /// How it ended.
        status: OutcomeStatus,
    },
}

impl SupplicantEvent {
    /// Event for a finished operation.
    pub fn from_outcome(outcome: ConnectionOutcome) -> Self {
        let ConnectionOutcome {
            device,
            kind,
            status,
        } = outcome;
        match kind {
            OperationKind::Connect => SupplicantEvent::ConnectResult { device, status },
            OperationKind::Disconnect => SupplicantEvent::DisconnectResult { device, status },
        }
    }

    /// Event discriminant.
    pub fn kind(&self) -> EventKind {
        match self {
            SupplicantEvent::ScanResult { .. } => EventKind::ScanResult,
            SupplicantEvent::ScanDone { .. } => EventKind::ScanDone,
            SupplicantEvent::ConnectResult { .. } => EventKind::ConnectResult,
            SupplicantEvent::DisconnectResult { .. } => EventKind::DisconnectResult,
        }
    }

    /// Device the event concerns.
    pub fn device(&self) -> &DeviceId {
        match self {
            SupplicantEvent::ScanResult { device, .. }
            | SupplicantEvent::ScanDone { device, .. }
            | SupplicantEvent::ConnectResult { device, .. }
            | SupplicantEvent::DisconnectResult { device, .. } => device,
        }
    }

    /// Status code carried by the event. Scan results carry none.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            SupplicantEvent::ScanResult { .. } => None,
            SupplicantEvent::ScanDone { status, .. } => Some(*status),
            SupplicantEvent::ConnectResult { status, .. }
            | SupplicantEvent::DisconnectResult { status, .. } => Some(status.code()),
        }
    }

    /// Operation outcome, for connect and disconnect results.
    pub fn outcome(&self) -> Option<ConnectionOutcome> {
        let (device, kind, status) = match self {
            SupplicantEvent::ConnectResult { device, status } => {
                (device, OperationKind::Connect, *status)
            }
            SupplicantEvent::DisconnectResult { device, status } => {
                (device, OperationKind::Disconnect, *status)
            }
            _ => return None,
        };
        Some(ConnectionOutcome {
            device: device.clone(),
            kind,
            status,
        })
    }

    /// Whether the event reports success. Scan results always do.
    pub fn is_success(&self) -> bool {
        self.status_code().is_none_or(|code| code == STATUS_SUCCESS)
    }
}

/// Fan-out of [`SupplicantEvent`]s to any number of subscribers. Cheap to
/// clone.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SupplicantEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<SupplicantEvent> {
        self.tx.subscribe()
    }

    /// Emit `event`. Returns the number of subscribers reached; having none
    /// is not an error.
    pub fn emit(&self, event: SupplicantEvent) -> usize {
        let kind = event.kind();
        match self.tx.send(event) {
            Ok(reached) => {
                trace!(?kind, reached, "event emitted");
                reached
            }
            Err(_) => {
                debug!(?kind, "event emitted with no subscribers");
                0
            }
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
