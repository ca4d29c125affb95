//! Interface status snapshot.

use std::fmt;

use crate::core::MacAddr;
use crate::engine::{
    Band, InterfaceMode, MfpMode, SupplicantEngine, WpaState, freq_to_band, freq_to_channel,
};

use super::params::SecurityType;

/// Wi-Fi generation of the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkMode {
    /// 802.11a/b/g.
    Legacy,
    /// 802.11n.
    Wifi4,
    /// 802.11ac.
    Wifi5,
    /// 802.11ax.
    Wifi6,
    /// 802.11ax in 6 GHz.
    Wifi6E,
    /// 802.11be.
    Wifi7,
}

impl fmt::Display for LinkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LinkMode::Legacy => "legacy",
            LinkMode::Wifi4 => "WIFI 4 (802.11n/HT)",
            LinkMode::Wifi5 => "WIFI 5 (802.11ac/VHT)",
            LinkMode::Wifi6 => "WIFI 6 (802.11ax/HE)",
            LinkMode::Wifi6E => "WIFI 6E (802.11ax 6GHz/HE)",
            LinkMode::Wifi7 => "WIFI 7 (802.11be/EHT)",
        };
        f.write_str(name)
    }
}

/// Read-only view of a device's connection.
///
/// Everything except `state` is left at its zero value unless the device is
/// at least associated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceStatus {
    /// Connection state.
    pub state: WpaState,
    /// Peer BSSID.
    pub bssid: MacAddr,
    /// Band of the association frequency.
    pub band: Option<Band>,
    /// Channel of the association frequency.
    pub channel: Option<u8>,
    /// Security of the active profile.
    pub security: SecurityType,
    /// Management frame protection of the active profile.
    pub mfp: MfpMode,
    /// Network name.
    pub ssid: Vec<u8>,
    /// Mode of the active profile.
    pub iface_mode: InterfaceMode,
    /// Wi-Fi generation of the association.
    ///
    /// Always `None`: it is derived from the association IEs, which
    /// [`LinkSnapshot`](crate::engine::LinkSnapshot) does not carry.
    pub link_mode: Option<LinkMode>,
    /// Signal in dBm, when the driver reported one.
    pub rssi: Option<i32>,
}

impl InterfaceStatus {
    /// Build a status from one engine snapshot.
    ///
    /// The signal is polled only for associated devices, and a failed poll
    /// leaves `rssi` empty.
    pub fn query(engine: &dyn SupplicantEngine) -> Self {
        let snapshot = engine.snapshot();
        let mut status = InterfaceStatus {
            state: snapshot.state,
            ..Default::default()
        };
        if !snapshot.state.is_associated() {
            return status;
        }

        status.bssid = snapshot.bssid;
        status.band = freq_to_band(snapshot.assoc_freq);
        status.channel = freq_to_channel(snapshot.assoc_freq);
        match &snapshot.current {
            Some(profile) => {
                status.security = SecurityType::from_key_mgmt(profile.key_mgmt);
                status.mfp = profile.mfp;
                status.iface_mode = profile.mode;
                status.ssid = profile.ssid.as_bytes().to_vec();
            }
            None => status.ssid = engine.driver_ssid().unwrap_or_default(),
        }

        status.rssi = engine.signal_poll().ok().map(|info| info.current_signal);
        status
    }

    /// Whether the device is at least associated.
    pub fn is_associated(&self) -> bool {
        self.state.is_associated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Ssid;
    use crate::engine::{KeyMgmt, NetworkProfile, SignalInfo, SimEngine};

    const BSSID: MacAddr = MacAddr::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);

    #[test]
    fn test_below_associated_is_empty() {
        let engine = SimEngine::new();
        engine.set_signal(Some(SignalInfo { current_signal: -40 }));
        engine.set_state(WpaState::Associating);

        let status = InterfaceStatus::query(&engine);
        assert_eq!(status.state, WpaState::Associating);
        assert!(status.bssid.is_zero());
        assert!(status.ssid.is_empty());
        assert_eq!(status.security, SecurityType::None);
        assert_eq!(status.rssi, None);
        assert_eq!(engine.signal_poll_count(), 0);
    }

    #[test]
    fn test_associated_fields() {
        let engine = SimEngine::new();
        let profile = NetworkProfile::station(Ssid::new(b"home-net".to_vec()).unwrap(), KeyMgmt::Sae);
        let id = engine.add_network(profile).unwrap();
        engine.select_network(id).unwrap();
        engine.set_link(WpaState::Completed, BSSID, 5180);
        engine.set_signal(Some(SignalInfo { current_signal: -52 }));

        let status = InterfaceStatus::query(&engine);
        assert_eq!(status.bssid, BSSID);
        assert_eq!(status.band, Some(Band::FiveGhz));
        assert_eq!(status.channel, Some(36));
        assert_eq!(status.security, SecurityType::Sae);
        assert_eq!(status.mfp, MfpMode::Optional);
        assert_eq!(status.ssid, b"home-net");
        assert_eq!(status.iface_mode, InterfaceMode::Infrastructure);
        assert_eq!(status.link_mode, None);
        assert_eq!(status.rssi, Some(-52));
    }

    #[test]
    fn test_ssid_falls_back_to_driver() {
        let engine = SimEngine::new();
        engine.set_driver_ssid(Some(b"from-driver".to_vec()));
        engine.set_link(WpaState::Associated, BSSID, 2437);

        let status = InterfaceStatus::query(&engine);
        assert_eq!(status.ssid, b"from-driver");
        assert_eq!(status.channel, Some(6));
        assert_eq!(status.band, Some(Band::TwoPointFourGhz));
        // Failed poll is not an error.
        assert_eq!(status.rssi, None);
        assert_eq!(engine.signal_poll_count(), 1);
    }
}
