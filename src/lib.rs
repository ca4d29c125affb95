//! # supplicant-bridge
//!
//! Control-plane glue between a Wi-Fi protocol engine and the outside world:
//!
//! - **Frame transport**: raw layer-2 send/receive of EAPOL and
//!   pre-authentication frames on a named interface, with received frames
//!   dispatched on a single event-processing task
//! - **Connection lifecycle**: asynchronous connect/disconnect requests with
//!   a timeout, exactly one outcome per accepted request, and supersession of
//!   stale requests
//! - **Request surface**: scan, access-point control and status queries
//!
//! The protocol engine itself (association state machine, key negotiation)
//! is an external collaborator reached through the
//! [`SupplicantEngine`](engine::SupplicantEngine) trait. The network stack is
//! reached through [`NetStack`](transport::NetStack).
//!
//! ## Feature Flags
//!
//! - `transport` (default): frame transport, event loop, in-memory stack
//! - `control` (default): engine interface, connection controller, request
//!   surface
//!
//! ## Modules
//!
//! - [`core`]: constants, shared value types and error taxonomy (always
//!   included)
//! - [`transport`]: frame transport (requires `transport` feature)
//! - [`engine`]: protocol-engine interface (requires `control` feature)
//! - [`control`]: connection controller (requires `control` feature)
//! - [`mgmt`]: request surface (requires `control` feature)
//!
//! ## Example Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use supplicant_bridge::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = SimEngine::new();
//! engine.complete_after(Duration::from_millis(10), MacAddr::new([2, 0, 0, 0, 0, 1]), 2412);
//!
//! let registry = StaticRegistry::new();
//! registry.insert("wlan0", Arc::new(engine));
//!
//! let manager = WifiManager::new(Arc::new(registry), ControllerConfig::default());
//! let mut events = manager.subscribe();
//!
//! let params = ConnectParams::builder("home-net")
//!     .psk("longpassword1")
//!     .security(SecurityType::Psk)
//!     .build()?;
//! manager.connect(&DeviceId::from("wlan0"), &params)?;
//!
//! let outcome = events.recv().await?.outcome();
//! assert!(outcome.is_some_and(|o| o.is_success()));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Transport layer (feature-gated)
#[cfg(feature = "transport")]
#[cfg_attr(docsrs, doc(cfg(feature = "transport")))]
pub mod transport;

// Engine interface (feature-gated)
#[cfg(feature = "control")]
#[cfg_attr(docsrs, doc(cfg(feature = "control")))]
pub mod engine;

// Connection controller (feature-gated)
#[cfg(feature = "control")]
#[cfg_attr(docsrs, doc(cfg(feature = "control")))]
pub mod control;

// Request surface (feature-gated)
#[cfg(feature = "control")]
#[cfg_attr(docsrs, doc(cfg(feature = "control")))]
pub mod mgmt;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core types
    pub use crate::core::*;

    // Transport types (when enabled)
    #[cfg(feature = "transport")]
    pub use crate::transport::{
        EventLoop, L2Packet, L2PacketConfig, L2PacketConfigBuilder, LinkAddr, MemoryStack,
        NetInterface, NetStack, PacketEndpoint, PacketFilter, RxCallback, SocketKind,
        TransportError, TransportResult,
    };

    // Engine, controller and request surface (when enabled)
    #[cfg(feature = "control")]
    pub use crate::control::*;
    #[cfg(feature = "control")]
    pub use crate::engine::{
        Credential, EngineError, EngineRegistry, KeyMaterial, KeyMgmt, MfpMode, NetworkId,
        NetworkProfile, SimEngine, StaticRegistry, SupplicantEngine, WpaState,
    };
    #[cfg(feature = "control")]
    pub use crate::mgmt::WifiManager;
}

// Re-export commonly used items at crate root
pub use core::{DeviceId, ErrorKind, MacAddr, Ssid, SupplicantError, SupplicantResult};

#[cfg(feature = "transport")]
pub use transport::{EventLoop, L2Packet, L2PacketConfig, NetStack, TransportError};

#[cfg(feature = "control")]
pub use control::{ConnectParams, ConnectionController, ConnectionOutcome, SupplicantEvent};

#[cfg(feature = "control")]
pub use mgmt::WifiManager;
