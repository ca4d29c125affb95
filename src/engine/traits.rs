//! Interface to the protocol engine.
//!
//! The engine owns the association state machine, key negotiation and
//! scanning. This crate only configures it and watches its state, through
//! [`SupplicantEngine`].

use thiserror::Error;
use tokio::sync::watch;

use crate::core::{ErrorKind, MacAddr};

use super::ieee80211::Band;
use super::profile::{KeyMgmt, MfpMode, NetworkId, NetworkProfile};
use super::state::WpaState;

/// Errors reported by the protocol engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No profile with this identifier.
    #[error("unknown network {0}")]
    UnknownNetwork(NetworkId),

    /// The engine is busy with a conflicting operation.
    #[error("engine busy")]
    Busy,

    /// The engine has shut down.
    #[error("engine unavailable")]
    Unavailable,

    /// The driver rejected the request.
    #[error("driver error: {0}")]
    Driver(String),
}

impl EngineError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::UnknownNetwork(_) => ErrorKind::NotFound,
            EngineError::Busy | EngineError::Unavailable | EngineError::Driver(_) => {
                ErrorKind::Resource
            }
        }
    }
}

/// Result type for engine calls.
pub type EngineResult<T> = Result<T, EngineError>;

/// Association record read in one step.
#[derive(Debug, Clone, Default)]
pub struct LinkSnapshot {
    /// Connection state.
    pub state: WpaState,
    /// Peer BSSID (zero when not associated).
    pub bssid: MacAddr,
    /// Association frequency in MHz (zero when not associated).
    pub assoc_freq: u32,
    /// Profile in use.
    pub current: Option<NetworkProfile>,
}

/// Signal reading from the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalInfo {
    /// Current signal in dBm.
    pub current_signal: i32,
}

/// Scan-time SSID filtering and AP selection policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanPolicy {
    /// Only report networks matching configured SSIDs.
    pub filter_ssids: bool,
    /// AP selection mode: 1 means the engine scans and selects.
    pub ap_scan: u8,
}

impl ScanPolicy {
    /// Policy applied for station connects.
    pub const STATION: Self = Self {
        filter_ssids: true,
        ap_scan: 1,
    };
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            filter_ssids: false,
            ap_scan: 1,
        }
    }
}

/// One BSS found by a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanEntry {
    /// Network name; empty for hidden networks.
    pub ssid: Vec<u8>,
    /// BSSID.
    pub bssid: MacAddr,
    /// Channel number.
    pub channel: u8,
    /// Band, if known.
    pub band: Option<Band>,
    /// Advertised key management.
    pub security: KeyMgmt,
    /// Advertised management frame protection.
    pub mfp: MfpMode,
    /// Received signal in dBm.
    pub rssi: i32,
}

/// Progress of a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanReport {
    /// A BSS was found.
    Entry(ScanEntry),
    /// The scan finished; `status` is 0 on success.
    Done {
        /// Engine status code.
        status: i32,
    },
}

/// Receives scan progress. Called once per entry, then once with
/// [`ScanReport::Done`].
pub type ScanCallback = Box<dyn FnMut(ScanReport) + Send>;

/// Per-device protocol engine.
///
/// Calls are synchronous from the caller's point of view and must not call
/// back into the connection controller.
pub trait SupplicantEngine: Send + Sync {
    /// Register a new profile.
    fn add_network(&self, profile: NetworkProfile) -> EngineResult<NetworkId>;

    /// Replace a stored profile.
    fn update_network(&self, id: NetworkId, profile: NetworkProfile) -> EngineResult<()>;

    /// Read a stored profile.
    fn network(&self, id: NetworkId) -> Option<NetworkProfile>;

    /// Make a profile eligible for selection.
    fn enable_network(&self, id: NetworkId) -> EngineResult<()>;

    /// Exclude a profile from selection.
    fn disable_network(&self, id: NetworkId) -> EngineResult<()>;

    /// Delete a profile.
    fn remove_network(&self, id: NetworkId) -> EngineResult<()>;

    /// Select a profile and start associating with it.
    fn select_network(&self, id: NetworkId) -> EngineResult<()>;

    /// Set the scan policy.
    fn set_scan_policy(&self, policy: ScanPolicy);

    /// Drop the current association. Idempotent.
    fn request_disconnection(&self);

    /// Current connection state.
    fn state(&self) -> WpaState {
        self.snapshot().state
    }

    /// Subscribe to state transitions.
    fn watch_state(&self) -> watch::Receiver<WpaState>;

    /// Consistent view of the association.
    fn snapshot(&self) -> LinkSnapshot;

    /// SSID as reported by the driver.
    fn driver_ssid(&self) -> Option<Vec<u8>>;

    /// Poll the driver for a signal reading.
    fn signal_poll(&self) -> EngineResult<SignalInfo>;

    /// Start a scan.
    fn scan(&self, callback: ScanCallback) -> EngineResult<()>;

    /// Start an access point with `profile`.
    fn start_ap(&self, profile: NetworkProfile) -> EngineResult<()>;

    /// Stop the access point.
    fn stop_ap(&self) -> EngineResult<()>;
}
