//! Wi-Fi management request surface.
//!
//! [`WifiManager`] is what an upper layer calls: scan, connect, disconnect,
//! access-point control and status. Connect and disconnect go through the
//! [`ConnectionController`]; the rest are synchronous forwards to the
//! device's engine.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{error, info};

use crate::control::{
    ConnectParams, ConnectionController, ControlError, ControllerConfig, EventBus,
    InterfaceStatus, PendingOperation, SupplicantEvent,
};
use crate::core::{DeviceId, SupplicantResult};
use crate::engine::{
    Credential, EngineRegistry, KeyMaterial, NetworkProfile, ScanReport, channel_to_freq,
};

/// Request surface over a set of devices.
#[derive(Debug)]
pub struct WifiManager {
    controller: ConnectionController,
}

impl WifiManager {
    /// Create a manager resolving devices through `registry`.
    pub fn new(registry: Arc<dyn EngineRegistry>, config: ControllerConfig) -> Self {
        Self {
            controller: ConnectionController::new(registry, config),
        }
    }

    /// Wrap an existing controller.
    pub fn with_controller(controller: ConnectionController) -> Self {
        Self { controller }
    }

    /// Start a scan.
    ///
    /// Each BSS found is emitted as a [`SupplicantEvent::ScanResult`],
    /// followed by one [`SupplicantEvent::ScanDone`] with the engine's
    /// status.
    pub fn scan(&self, device: &DeviceId) -> SupplicantResult<()> {
        let engine = self.controller.engine(device)?;
        let events = self.controller.events().clone();
        let scanning = device.clone();

        engine
            .scan(Box::new(move |report| {
                let event = match report {
                    ScanReport::Entry(entry) => SupplicantEvent::ScanResult {
                        device: scanning.clone(),
                        entry,
                    },
                    ScanReport::Done { status } => SupplicantEvent::ScanDone {
                        device: scanning.clone(),
                        status,
                    },
                };
                events.emit(event);
            }))
            .map_err(ControlError::from)
            .inspect_err(|e| error!(device = %device, error = %e, "scan request failed"))?;

        info!(device = %device, "scan requested");
        Ok(())
    }

    /// Request a connection. See [`ConnectionController::connect`].
    pub fn connect(
        &self,
        device: &DeviceId,
        params: &ConnectParams,
    ) -> SupplicantResult<PendingOperation> {
        Ok(self.controller.connect(device, params)?)
    }

    /// Request a disconnection. See [`ConnectionController::disconnect`].
    pub fn disconnect(&self, device: &DeviceId) -> SupplicantResult<PendingOperation> {
        Ok(self.controller.disconnect(device)?)
    }

    /// Start an access point with `params`.
    ///
    /// The SSID, PSK and security type map to the profile the same way as
    /// for a connect. A channel, when given, must be a valid 2.4 or 5 GHz
    /// channel.
    pub fn ap_enable(&self, device: &DeviceId, params: &ConnectParams) -> SupplicantResult<()> {
        let engine = self.controller.engine(device)?;

        let frequency = match params.channel() {
            Some(channel) => Some(channel_to_freq(channel).ok_or_else(|| {
                ControlError::InvalidParams(format!("invalid channel {channel}"))
            })?),
            None => None,
        };

        let key_mgmt = params.key_mgmt();
        let mut profile = NetworkProfile::access_point(params.ssid().clone(), key_mgmt, frequency);
        if let Some(psk) = params.psk() {
            let key = KeyMaterial::copy_from(psk).map_err(ControlError::from)?;
            profile = profile.with_credential(Credential::for_key_mgmt(key_mgmt, key));
        }

        engine
            .start_ap(profile)
            .map_err(ControlError::from)
            .inspect_err(|e| error!(device = %device, error = %e, "failed to start access point"))?;

        info!(device = %device, ssid = %params.ssid(), ?key_mgmt, ?frequency, "access point started");
        Ok(())
    }

    /// Stop the access point.
    pub fn ap_disable(&self, device: &DeviceId) -> SupplicantResult<()> {
        let engine = self.controller.engine(device)?;
        engine.stop_ap().map_err(ControlError::from)?;
        info!(device = %device, "access point stopped");
        Ok(())
    }

    /// Current status of `device`.
    pub fn status(&self, device: &DeviceId) -> SupplicantResult<InterfaceStatus> {
        Ok(self.controller.status(device)?)
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> broadcast::Receiver<SupplicantEvent> {
        self.controller.subscribe()
    }

    /// Event bus.
    pub fn events(&self) -> &EventBus {
        self.controller.events()
    }

    /// Underlying controller.
    pub fn controller(&self) -> &ConnectionController {
        &self.controller
    }
}
