//! Connection-lifecycle controller.
//!
//! This module provides:
//!
//! - **Requests**: [`ConnectParams`] validated at the boundary, with the key
//!   management suite chosen from the security type and PSK presence
//! - **Controller**: [`ConnectionController`] accepts connect/disconnect
//!   requests and runs at most one [`PendingOperation`] per device
//! - **Outcomes**: every accepted operation ends in exactly one
//!   [`ConnectionOutcome`], published as a [`SupplicantEvent`] on the
//!   [`EventBus`], unless a newer operation superseded it first
//! - **Status**: [`InterfaceStatus`] built from one consistent engine snapshot
//!
//! # Lifecycle
//!
//! ```text
//! connect ──▶ Started ──▶ Polling ──┬──▶ Completed ──▶ ConnectResult(0)
//!                                   ├──▶ TimedOut  ──▶ disconnect, ConnectResult(1)
//!                                   ├──▶ Aborted   ──▶ ConnectResult(1)
//!                                   └──▶ Superseded     (silent)
//! ```

mod config;
mod controller;
mod error;
mod events;
mod operation;
mod params;
mod status;
mod worker;

pub use config::{ControllerConfig, ControllerConfigBuilder, StaleProfilePolicy};
pub use controller::{ConnectionController, ConnectionControllerBuilder};
pub use error::{ControlError, ControlResult};
pub use events::{EventBus, EventKind, SupplicantEvent};
pub use operation::{
    ConnectionOutcome, FailureReason, OperationKind, OperationPhase, OutcomeStatus,
    PendingOperation,
};
pub use params::{ConnectParams, ConnectParamsBuilder, SecurityType, select_key_mgmt};
pub use status::{InterfaceStatus, LinkMode};
