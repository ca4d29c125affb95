//! Network profiles stored inside the protocol engine.

use std::fmt;

use crate::core::Ssid;

use super::secret::KeyMaterial;

/// Engine-assigned profile identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NetworkId(pub u32);

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Key management suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyMgmt {
    /// Open network.
    #[default]
    None,
    /// WPA/WPA2-Personal.
    Psk,
    /// WPA2-Personal with SHA-256 key derivation.
    PskSha256,
    /// WPA3-Personal (SAE).
    Sae,
}

/// Management frame protection (802.11w).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MfpMode {
    /// Not used.
    #[default]
    Disabled,
    /// Used when the peer supports it.
    Optional,
    /// Mandatory.
    Required,
}

/// Operating mode a profile is used in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterfaceMode {
    /// Station associated with an access point.
    #[default]
    Infrastructure,
    /// Soft access point.
    AccessPoint,
}

/// Secret attached to a profile.
#[derive(Debug, Clone)]
pub enum Credential {
    /// WPA passphrase (PSK suites).
    Passphrase(KeyMaterial),
    /// SAE password.
    SaePassword(KeyMaterial),
}

impl Credential {
    /// Wrap `key` in the field `key_mgmt` reads from.
    pub fn for_key_mgmt(key_mgmt: KeyMgmt, key: KeyMaterial) -> Self {
        match key_mgmt {
            KeyMgmt::Sae => Credential::SaePassword(key),
            KeyMgmt::None | KeyMgmt::Psk | KeyMgmt::PskSha256 => Credential::Passphrase(key),
        }
    }

    /// The secret bytes, whichever field they live in.
    pub fn key_material(&self) -> &KeyMaterial {
        match self {
            Credential::Passphrase(key) | Credential::SaePassword(key) => key,
        }
    }
}

/// A stored network configuration.
#[derive(Debug, Clone)]
pub struct NetworkProfile {
    /// Network name.
    pub ssid: Ssid,
    /// Key management suite.
    pub key_mgmt: KeyMgmt,
    /// Passphrase or SAE password.
    pub credential: Option<Credential>,
    /// Management frame protection.
    pub mfp: MfpMode,
    /// Station or access point.
    pub mode: InterfaceMode,
    /// Operating frequency in MHz (access point only).
    pub frequency: Option<u32>,
    /// Excluded from network selection until enabled.
    pub disabled: bool,
}

impl NetworkProfile {
    /// Station profile, disabled until selected.
    pub fn station(ssid: Ssid, key_mgmt: KeyMgmt) -> Self {
        Self {
            ssid,
            key_mgmt,
            credential: None,
            mfp: MfpMode::Optional,
            mode: InterfaceMode::Infrastructure,
            frequency: None,
            disabled: true,
        }
    }

    /// Access-point profile.
    pub fn access_point(ssid: Ssid, key_mgmt: KeyMgmt, frequency: Option<u32>) -> Self {
        Self {
            ssid,
            key_mgmt,
            credential: None,
            mfp: MfpMode::Optional,
            mode: InterfaceMode::AccessPoint,
            frequency,
            disabled: false,
        }
    }

    /// Attach a secret.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Secret bytes, if any.
    pub fn key_material(&self) -> Option<&KeyMaterial> {
        self.credential.as_ref().map(Credential::key_material)
    }
}
