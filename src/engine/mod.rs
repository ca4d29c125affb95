//! Protocol-engine interface.
//!
//! The engine (association state machine, key negotiation, scanning) is an
//! external collaborator. This module defines what the controller needs from
//! it:
//!
//! - **State**: [`WpaState`], ordered, with `Completed` as the terminal value
//! - **Profiles**: [`NetworkProfile`] with [`KeyMgmt`], [`MfpMode`] and a
//!   [`Credential`] held in [`KeyMaterial`]
//! - **Engine**: the [`SupplicantEngine`] trait and the [`EngineRegistry`]
//!   that resolves a device to its engine
//! - **Helpers**: 802.11 frequency/channel/band conversion
//!
//! [`SimEngine`] is an in-process engine driven by a script.

mod ieee80211;
mod profile;
mod registry;
mod secret;
mod sim;
mod state;
mod traits;

pub use ieee80211::{Band, channel_to_freq, freq_to_band, freq_to_channel};
pub use profile::*;
pub use registry::{EngineRegistry, StaticRegistry};
pub use secret::{KeyMaterial, KeyMaterialError};
pub use sim::SimEngine;
pub use state::WpaState;
pub use traits::*;
