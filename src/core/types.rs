//! Value types shared across layers.

use std::fmt;
use std::str::FromStr;

use super::constants::{ETH_ALEN, MAX_SSID_LEN};
use super::error::{AddrParseError, SsidError};

/// 48-bit IEEE 802 hardware address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct MacAddr(pub [u8; ETH_ALEN]);

impl MacAddr {
    /// The all-zero address, used as the "not known" sentinel.
    pub const ZERO: Self = Self([0; ETH_ALEN]);

    /// The broadcast address.
    pub const BROADCAST: Self = Self([0xff; ETH_ALEN]);

    /// Create from raw bytes.
    pub const fn new(bytes: [u8; ETH_ALEN]) -> Self {
        Self(bytes)
    }

    /// Create from a slice, which must be exactly [`ETH_ALEN`] bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; ETH_ALEN] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ETH_ALEN] {
        &self.0
    }

    /// Check for the all-zero address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0; ETH_ALEN]
    }

    /// Check for the group (multicast/broadcast) bit.
    pub fn is_multicast(&self) -> bool {
        self.0[0] & 0x01 != 0
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl FromStr for MacAddr {
    type Err = AddrParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; ETH_ALEN];
        let mut parts = s.split(':');
        for byte in &mut bytes {
            let part = parts.next().ok_or(AddrParseError(s.to_owned()))?;
            if part.len() != 2 {
                return Err(AddrParseError(s.to_owned()));
            }
            *byte = u8::from_str_radix(part, 16).map_err(|_| AddrParseError(s.to_owned()))?;
        }
        if parts.next().is_some() {
            return Err(AddrParseError(s.to_owned()));
        }
        Ok(Self(bytes))
    }
}

impl From<[u8; ETH_ALEN]> for MacAddr {
    fn from(bytes: [u8; ETH_ALEN]) -> Self {
        Self(bytes)
    }
}

/// A validated SSID: 1 to [`MAX_SSID_LEN`] arbitrary bytes.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Ssid(Vec<u8>);

impl Ssid {
    /// Validate and wrap raw SSID bytes.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SsidError> {
        let bytes = bytes.into();
        match bytes.len() {
            0 => Err(SsidError::Empty),
            len if len > MAX_SSID_LEN => Err(SsidError::TooLong { len }),
            _ => Ok(Self(bytes)),
        }
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length in bytes (never zero).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; present for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume into the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl fmt::Debug for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ssid({:?})", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Display for Ssid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}

impl TryFrom<&str> for Ssid {
    type Error = SsidError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.as_bytes())
    }
}

/// Name of a Wi-Fi device managed by one protocol-engine instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeviceId(String);

impl DeviceId {
    /// Create a device identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the device name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DeviceId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for DeviceId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Network interface index as assigned by the network stack (never zero
/// for a live interface).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IfIndex(pub u32);

impl IfIndex {
    /// Get the raw index.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for IfIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mac_display_and_parse() {
        let mac = MacAddr::new([0x02, 0x00, 0x5e, 0x10, 0xab, 0xff]);
        let text = mac.to_string();
        assert_eq!(text, "02:00:5e:10:ab:ff");
        assert_eq!(text.parse::<MacAddr>().unwrap(), mac);
    }

    #[test]
    fn test_mac_parse_rejects_malformed() {
        assert!("02:00:5e:10:ab".parse::<MacAddr>().is_err());
        assert!("02:00:5e:10:ab:ff:00".parse::<MacAddr>().is_err());
        assert!("02:00:5e:10:ab:zz".parse::<MacAddr>().is_err());
        assert!("2:00:5e:10:ab:ff".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_mac_flags() {
        assert!(MacAddr::ZERO.is_zero());
        assert!(MacAddr::BROADCAST.is_multicast());
        assert!(!MacAddr::new([0x02, 0, 0, 0, 0, 1]).is_multicast());
        assert_eq!(MacAddr::from_slice(&[1, 2, 3]), None);
    }

    #[test]
    fn test_ssid_bounds() {
        assert!(matches!(Ssid::new(Vec::new()), Err(SsidError::Empty)));
        assert_eq!(Ssid::new(vec![b'a'; MAX_SSID_LEN]).unwrap().len(), MAX_SSID_LEN);
        assert!(matches!(
            Ssid::new(vec![b'a'; MAX_SSID_LEN + 1]),
            Err(SsidError::TooLong { len: 33 })
        ));
    }

    #[test]
    fn test_ssid_non_utf8_display() {
        let ssid = Ssid::new(vec![0x68, 0x69, 0xff]).unwrap();
        assert_eq!(ssid.as_bytes(), &[0x68, 0x69, 0xff]);
        assert!(ssid.to_string().starts_with("hi"));
    }
}
