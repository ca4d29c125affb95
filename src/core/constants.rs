//! Constants shared by the transport and controller layers.
//!
//! Link-layer sizes follow IEEE 802.3 / 802.11; the timing values define the
//! controller's observable contract and MUST NOT be changed casually.

use std::time::Duration;

// =============================================================================
// LINK LAYER
// =============================================================================

/// Hardware (MAC) address length.
pub const ETH_ALEN: usize = 6;

/// Ethernet header length (destination + source + ethertype).
pub const ETH_HLEN: usize = 14;

/// Receive buffer capacity, sized for the largest expected 802.11 frame
/// after conversion to Ethernet framing.
pub const L2_RECV_BUFFER_SIZE: usize = 2300;

/// Longest interface name accepted by the transport.
pub const IFNAME_MAX_LEN: usize = 16;

/// Match every protocol on a packet endpoint.
pub const ETH_P_ALL: u16 = 0x0003;

/// EAP over LAN (802.1X), the protocol the engine uses for key negotiation.
pub const ETH_P_EAPOL: u16 = 0x888e;

/// RSN pre-authentication.
pub const ETH_P_RSN_PREAUTH: u16 = 0x88c7;

// =============================================================================
// 802.11 LIMITS
// =============================================================================

/// Maximum SSID length in bytes.
pub const MAX_SSID_LEN: usize = 32;

/// Maximum length of a passphrase or SAE password.
pub const MAX_KEY_MATERIAL_LEN: usize = 128;

// =============================================================================
// CONNECTION LIFECYCLE
// =============================================================================

/// One controller time-unit.
pub const TIME_UNIT: Duration = Duration::from_secs(1);

/// Connect timeout, in time-units, when the request does not specify one.
pub const DEFAULT_CONNECTION_TIMEOUT_UNITS: u32 = 15;

/// Connect timeout used when the request does not specify a positive one.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration =
    Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_UNITS as u64);

/// Default capacity of the event-notification channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 64;

// =============================================================================
// STATUS CODES
// =============================================================================

/// Status code carried by successful events.
pub const STATUS_SUCCESS: i32 = 0;

/// Status code carried by failed events.
pub const STATUS_FAILURE: i32 = 1;
