//! Management request surface.
//!
//! High-level API for the layer above the supplicant.

mod manager;

pub use manager::WifiManager;
