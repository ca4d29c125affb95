//! Connect / access-point request parameters.

use std::fmt;
use std::time::Duration;

use zeroize::Zeroizing;

use crate::core::{Ssid, TIME_UNIT};
use crate::engine::KeyMgmt;

use super::error::{ControlError, ControlResult};

/// Requested security, as carried by management requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SecurityType {
    /// Open network.
    #[default]
    None,
    /// WPA/WPA2-Personal.
    Psk,
    /// WPA2-Personal with SHA-256 key derivation.
    PskSha256,
    /// WPA3-Personal.
    Sae,
}

impl SecurityType {
    /// Parse the numeric code used on the management interface.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(SecurityType::None),
            1 => Some(SecurityType::Psk),
            2 => Some(SecurityType::PskSha256),
            3 => Some(SecurityType::Sae),
            _ => None,
        }
    }

    /// Numeric code used on the management interface.
    pub fn code(self) -> u8 {
        match self {
            SecurityType::None => 0,
            SecurityType::Psk => 1,
            SecurityType::PskSha256 => 2,
            SecurityType::Sae => 3,
        }
    }

    /// Security of a profile with `key_mgmt`.
    pub fn from_key_mgmt(key_mgmt: KeyMgmt) -> Self {
        match key_mgmt {
            KeyMgmt::None => SecurityType::None,
            KeyMgmt::Psk => SecurityType::Psk,
            KeyMgmt::PskSha256 => SecurityType::PskSha256,
            KeyMgmt::Sae => SecurityType::Sae,
        }
    }
}

impl fmt::Display for SecurityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecurityType::None => "OPEN",
            SecurityType::Psk => "WPA2-PSK",
            SecurityType::PskSha256 => "WPA2-PSK-SHA256",
            SecurityType::Sae => "WPA3-SAE",
        };
        f.write_str(name)
    }
}

/// Key management for a request with or without a PSK.
///
/// Without a PSK the network is open whatever `security` says. With one,
/// SAE and PSK-SHA256 are honoured and anything else means legacy PSK.
pub fn select_key_mgmt(has_psk: bool, security: SecurityType) -> KeyMgmt {
    match (has_psk, security) {
        (false, _) => KeyMgmt::None,
        (true, SecurityType::Sae) => KeyMgmt::Sae,
        (true, SecurityType::PskSha256) => KeyMgmt::PskSha256,
        (true, SecurityType::None | SecurityType::Psk) => KeyMgmt::Psk,
    }
}

/// Parameters of a connect or access-point request.
///
/// The PSK is zeroized when the parameters are dropped.
#[derive(Clone)]
pub struct ConnectParams {
    ssid: Ssid,
    psk: Option<Zeroizing<Vec<u8>>>,
    security: SecurityType,
    channel: Option<u8>,
    timeout: Option<Duration>,
}

impl ConnectParams {
    /// Start building parameters for `ssid`.
    pub fn builder(ssid: impl Into<Vec<u8>>) -> ConnectParamsBuilder {
        ConnectParamsBuilder::new(ssid)
    }

    /// Network name.
    pub fn ssid(&self) -> &Ssid {
        &self.ssid
    }

    /// Pre-shared key or password.
    pub fn psk(&self) -> Option<&[u8]> {
        self.psk.as_ref().map(|psk| psk.as_slice())
    }

    /// Requested security.
    pub fn security(&self) -> SecurityType {
        self.security
    }

    /// Requested channel.
    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Requested timeout, if any.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Timeout to enforce: the requested one if positive, else `default`.
    pub fn effective_timeout(&self, default: Duration) -> Duration {
        self.timeout
            .filter(|timeout| !timeout.is_zero())
            .unwrap_or(default)
    }

    /// Key management this request maps to.
    pub fn key_mgmt(&self) -> KeyMgmt {
        select_key_mgmt(self.psk.is_some(), self.security)
    }
}

impl fmt::Debug for ConnectParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParams")
            .field("ssid", &self.ssid)
            .field("psk", &self.psk.as_ref().map(|_| "[REDACTED]"))
            .field("security", &self.security)
            .field("channel", &self.channel)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Builder for [`ConnectParams`].
pub struct ConnectParamsBuilder {
    ssid: Vec<u8>,
    psk: Option<Zeroizing<Vec<u8>>>,
    security: SecurityType,
    channel: Option<u8>,
    timeout: Option<Duration>,
}

impl ConnectParamsBuilder {
    /// Create a builder for an open network named `ssid`.
    pub fn new(ssid: impl Into<Vec<u8>>) -> Self {
        Self {
            ssid: ssid.into(),
            psk: None,
            security: SecurityType::None,
            channel: None,
            timeout: None,
        }
    }

    /// Set the pre-shared key or password.
    pub fn psk(mut self, psk: impl AsRef<[u8]>) -> Self {
        self.psk = Some(Zeroizing::new(psk.as_ref().to_vec()));
        self
    }

    /// Set the requested security.
    pub fn security(mut self, security: SecurityType) -> Self {
        self.security = security;
        self
    }

    /// Set the channel.
    pub fn channel(mut self, channel: u8) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Set the connect timeout. Zero means the controller default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connect timeout in whole time-units. Non-positive values
    /// mean the controller default.
    pub fn timeout_units(mut self, units: i32) -> Self {
        self.timeout = u32::try_from(units)
            .ok()
            .filter(|units| *units > 0)
            .map(|units| TIME_UNIT * units);
        self
    }

    /// Validate and build.
    pub fn build(self) -> ControlResult<ConnectParams> {
        let ssid = Ssid::new(self.ssid).map_err(ControlError::from)?;
        Ok(ConnectParams {
            ssid,
            psk: self.psk,
            security: self.security,
            channel: self.channel,
            timeout: self.timeout,
        })
    }
}

impl fmt::Debug for ConnectParamsBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectParamsBuilder")
            .field("ssid", &String::from_utf8_lossy(&self.ssid))
            .field("psk", &self.psk.as_ref().map(|_| "[REDACTED]"))
            .field("security", &self.security)
            .finish_non_exhaustive()
    }
}
