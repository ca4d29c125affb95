//! Connection-lifecycle controller.
//!
//! Turns connect/disconnect requests into observable, timeout-bounded
//! operations. Each device has at most one pending operation; a new request
//! supersedes the previous one, whose worker exits without reporting.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::core::DeviceId;
use crate::engine::{
    Credential, EngineRegistry, EngineResult, KeyMaterial, NetworkId, NetworkProfile, ScanPolicy,
    SupplicantEngine,
};

use super::config::ControllerConfig;
use super::error::{ControlError, ControlResult};
use super::events::{EventBus, SupplicantEvent};
use super::operation::{OperationKind, OperationPhase, PendingOperation};
use super::params::ConnectParams;
use super::status::InterfaceStatus;
use super::worker::Worker;

/// Per-device single-flight state.
#[derive(Default)]
struct DeviceSlot {
    generation: u64,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
    pending: Option<PendingOperation>,
}

/// State shared between the controller and its workers.
pub(super) struct ControllerShared {
    slots: Mutex<HashMap<DeviceId, DeviceSlot>>,
    events: EventBus,
}

impl ControllerShared {
    fn slots(&self) -> MutexGuard<'_, HashMap<DeviceId, DeviceSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Record `phase` for `op`. Returns `false` if `op` was superseded.
    pub(super) fn advance(&self, op: &PendingOperation, phase: OperationPhase) -> bool {
        let mut slots = self.slots();
        match slots.get_mut(&op.device) {
            Some(slot) if slot.generation == op.generation => {
                if let Some(pending) = slot.pending.as_mut() {
                    pending.phase = phase;
                }
                true
            }
            _ => false,
        }
    }

    /// End `op` and emit the event built by `finish`, unless `op` was
    /// superseded. `finish` runs under the slot lock.
    pub(super) fn settle(
        &self,
        op: &PendingOperation,
        finish: impl FnOnce() -> SupplicantEvent,
    ) -> bool {
        let mut slots = self.slots();
        let Some(slot) = slots.get_mut(&op.device) else {
            return false;
        };
        if slot.generation != op.generation {
            return false;
        }
        let event = finish();
        slot.pending = None;
        self.events.emit(event);
        true
    }
}

/// Connection-lifecycle controller.
///
/// # Example
///
/// ```ignore
/// let controller = ConnectionController::builder(registry).build();
/// let mut events = controller.subscribe();
///
/// let params = ConnectParams::builder("home-net")
///     .psk("longpassword1")
///     .security(SecurityType::Psk)
///     .build()?;
/// controller.connect(&"wlan0".into(), &params)?;
///
/// let outcome = events.recv().await?.outcome();
/// ```
pub struct ConnectionController {
    registry: Arc<dyn EngineRegistry>,
    config: ControllerConfig,
    shared: Arc<ControllerShared>,
}

impl ConnectionController {
    /// Create a controller with its own event bus.
    pub fn new(registry: Arc<dyn EngineRegistry>, config: ControllerConfig) -> Self {
        let events = EventBus::new(config.event_capacity.max(1));
        Self::with_events(registry, config, events)
    }

    /// Start a builder.
    pub fn builder(registry: Arc<dyn EngineRegistry>) -> ConnectionControllerBuilder {
        ConnectionControllerBuilder::new(registry)
    }

    fn with_events(
        registry: Arc<dyn EngineRegistry>,
        config: ControllerConfig,
        events: EventBus,
    ) -> Self {
        Self {
            registry,
            config,
            shared: Arc::new(ControllerShared {
                slots: Mutex::new(HashMap::new()),
                events,
            }),
        }
    }

    /// Request a connection.
    ///
    /// Registers a profile, enables and selects it, then supersedes any
    /// pending operation on `device` and starts a worker. Returns as soon as
    /// the request is accepted; the result arrives as a
    /// [`SupplicantEvent::ConnectResult`].
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn connect(
        &self,
        device: &DeviceId,
        params: &ConnectParams,
    ) -> ControlResult<PendingOperation> {
        let engine = self.engine(device)?;
        let key_mgmt = params.key_mgmt();

        let mut profile = NetworkProfile::station(params.ssid().clone(), key_mgmt);
        let network = engine.add_network(profile.clone())?;
        engine.set_scan_policy(ScanPolicy::STATION);

        if let Some(psk) = params.psk() {
            let key = KeyMaterial::copy_from(psk).inspect_err(|e| {
                error!(device = %device, network = %network, error = %e, "failed to copy key material");
            })?;
            profile.credential = Some(Credential::for_key_mgmt(key_mgmt, key));
            engine.update_network(network, profile)?;
        }

        let timeout = params.effective_timeout(self.config.default_timeout);
        let op = self.launch(
            device,
            engine,
            OperationKind::Connect,
            Some(timeout),
            Some(network),
            |engine| {
                engine.enable_network(network)?;
                engine.select_network(network)
            },
        )?;

        info!(
            device = %device,
            ssid = %params.ssid(),
            ?key_mgmt,
            network = %network,
            ?timeout,
            generation = op.generation,
            "connect accepted"
        );
        Ok(op)
    }

    /// Request a disconnection.
    ///
    /// The engine call is synchronous, so the worker only reports success.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn disconnect(&self, device: &DeviceId) -> ControlResult<PendingOperation> {
        let engine = self.engine(device)?;
        let op = self.launch(
            device,
            engine,
            OperationKind::Disconnect,
            None,
            None,
            |engine| {
                engine.request_disconnection();
                Ok(())
            },
        )?;

        info!(device = %device, generation = op.generation, "disconnect accepted");
        Ok(op)
    }

    /// Current status of `device`.
    pub fn status(&self, device: &DeviceId) -> ControlResult<InterfaceStatus> {
        let engine = self.engine(device)?;
        Ok(InterfaceStatus::query(engine.as_ref()))
    }

    /// Subscribe to events.
    pub fn subscribe(&self) -> broadcast::Receiver<SupplicantEvent> {
        self.shared.events.subscribe()
    }

    /// Event bus outcomes are emitted on.
    pub fn events(&self) -> &EventBus {
        &self.shared.events
    }

    /// Pending operation of `device`.
    pub fn pending(&self, device: &DeviceId) -> Option<PendingOperation> {
        self.shared
            .slots()
            .get(device)
            .and_then(|slot| slot.pending.clone())
    }

    /// Whether `device` has an operation in flight.
    pub fn is_pending(&self, device: &DeviceId) -> bool {
        self.pending(device).is_some()
    }

    /// Controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Engine registry.
    pub fn registry(&self) -> &Arc<dyn EngineRegistry> {
        &self.registry
    }

    pub(crate) fn engine(&self, device: &DeviceId) -> ControlResult<Arc<dyn SupplicantEngine>> {
        self.registry.engine(device).ok_or_else(|| {
            error!(device = %device, "no engine for device");
            ControlError::DeviceNotFound(device.clone())
        })
    }

    /// Run `prepare`, then replace the pending operation of `device` with a
    /// new one and start its worker.
    ///
    /// Holding the slot lock across `prepare` keeps a superseded worker from
    /// acting on the engine between the two steps.
    fn launch(
        &self,
        device: &DeviceId,
        engine: Arc<dyn SupplicantEngine>,
        kind: OperationKind,
        timeout: Option<Duration>,
        network: Option<NetworkId>,
        prepare: impl FnOnce(&dyn SupplicantEngine) -> EngineResult<()>,
    ) -> ControlResult<PendingOperation> {
        let mut slots = self.shared.slots();
        prepare(engine.as_ref())?;

        let slot = slots.entry(device.clone()).or_default();
        slot.generation += 1;
        slot.cancel.cancel();
        slot.cancel = CancellationToken::new();
        if let Some(previous) = slot.pending.take() {
            debug!(
                device = %device,
                kind = %previous.kind,
                generation = previous.generation,
                phase = ?OperationPhase::Superseded,
                "superseding pending operation"
            );
        }

        let op = PendingOperation {
            device: device.clone(),
            kind,
            timeout,
            generation: slot.generation,
            phase: OperationPhase::Started,
        };
        slot.pending = Some(op.clone());

        let worker = Worker {
            op: op.clone(),
            engine,
            network,
            stale_profile: self.config.stale_profile,
            cancel: slot.cancel.clone(),
            previous: slot.worker.take(),
            shared: Arc::clone(&self.shared),
        };
        slot.worker = Some(tokio::spawn(worker.run()));
        Ok(op)
    }
}

impl Drop for ConnectionController {
    fn drop(&mut self) {
        for slot in self.shared.slots().values() {
            slot.cancel.cancel();
        }
    }
}

impl fmt::Debug for ConnectionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionController")
            .field("config", &self.config)
            .field("devices", &self.shared.slots().len())
            .finish()
    }
}

/// Builder for [`ConnectionController`].
pub struct ConnectionControllerBuilder {
    registry: Arc<dyn EngineRegistry>,
    config: ControllerConfig,
    events: Option<EventBus>,
}

impl ConnectionControllerBuilder {
    /// Create a builder with default configuration.
    pub fn new(registry: Arc<dyn EngineRegistry>) -> Self {
        Self {
            registry,
            config: ControllerConfig::default(),
            events: None,
        }
    }

    /// Set the configuration.
    pub fn config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Emit on an existing bus instead of a new one.
    pub fn events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }

    /// Build the controller.
    pub fn build(self) -> ConnectionController {
        match self.events {
            Some(events) => ConnectionController::with_events(self.registry, self.config, events),
            None => ConnectionController::new(self.registry, self.config),
        }
    }
}

impl fmt::Debug for ConnectionControllerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionControllerBuilder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
