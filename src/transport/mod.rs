//! Frame transport: raw layer-2 send/receive for the supplicant engine.
//!
//! This module provides:
//!
//! - **Bindings**: [`L2Packet`] opens a packet endpoint on a named interface,
//!   bound to one protocol (typically EAPOL), and resolves the interface's
//!   hardware address
//! - **Event dispatch**: [`EventLoop`] runs receive callbacks one at a time on
//!   a single task
//! - **Stack abstraction**: [`NetStack`] and [`PacketEndpoint`] are the only
//!   way the transport reaches the network; [`MemoryStack`] implements them
//!   in-process and is the only backend in this crate
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Supplicant engine (EAPOL)        │
//! ├─────────────────────────────────────────┤
//! │   L2Packet  ──rx callback──  EventLoop  │  ← This module
//! ├─────────────────────────────────────────┤
//! │     NetStack / PacketEndpoint           │
//! └─────────────────────────────────────────┘
//! ```

mod eloop;
mod error;
mod l2_packet;
mod memory;
mod stack;

pub use eloop::{EventLoop, ReadHandler};
pub use error::*;
pub use l2_packet::{L2Packet, L2PacketConfig, L2PacketConfigBuilder, RxCallback};
pub use memory::{MemoryEndpoint, MemoryStack, SentFrame};
pub use stack::*;
