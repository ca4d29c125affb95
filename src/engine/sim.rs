//! Scriptable in-process protocol engine.
//!
//! [`SimEngine`] keeps profiles and association state in memory and walks
//! the state machine on a timer instead of talking to a driver. It backs the
//! controller tests and dry runs.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::core::MacAddr;

use super::profile::{NetworkId, NetworkProfile};
use super::state::WpaState;
use super::traits::{
    EngineError, EngineResult, LinkSnapshot, ScanCallback, ScanEntry, ScanPolicy, ScanReport,
    SignalInfo, SupplicantEngine,
};

/// Association the engine completes after `delay` once a network is
/// selected.
#[derive(Debug, Clone, Copy)]
struct Script {
    delay: Duration,
    bssid: MacAddr,
    freq: u32,
}

struct SimState {
    /// Dropped by [`SimEngine::shutdown`].
    tx: Option<watch::Sender<WpaState>>,
    state: WpaState,
    bssid: MacAddr,
    assoc_freq: u32,
    current: Option<NetworkId>,
    profiles: BTreeMap<NetworkId, NetworkProfile>,
    next_id: u32,
    scan_policy: ScanPolicy,
    driver_ssid: Option<Vec<u8>>,
    signal: Option<SignalInfo>,
    scan_results: Vec<ScanEntry>,
    scan_status: i32,
    access_point: Option<NetworkProfile>,
    script: Option<Script>,
    /// Bumped on every select/disconnect; stale completions are discarded.
    epoch: u64,
}

impl SimState {
    fn publish(&mut self, state: WpaState) {
        self.state = state;
        if let Some(tx) = &self.tx {
            tx.send_replace(state);
        }
    }

    fn profile_mut(&mut self, id: NetworkId) -> EngineResult<&mut NetworkProfile> {
        self.profiles
            .get_mut(&id)
            .ok_or(EngineError::UnknownNetwork(id))
    }
}

struct Shared {
    state: Mutex<SimState>,
    state_rx: watch::Receiver<WpaState>,
    disconnects: AtomicUsize,
    signal_polls: AtomicUsize,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// In-process [`SupplicantEngine`].
#[derive(Clone)]
pub struct SimEngine {
    shared: Arc<Shared>,
}

impl SimEngine {
    /// Create a disconnected engine with no profiles.
    pub fn new() -> Self {
        let (tx, state_rx) = watch::channel(WpaState::Disconnected);
        let state = SimState {
            tx: Some(tx),
            state: WpaState::Disconnected,
            bssid: MacAddr::ZERO,
            assoc_freq: 0,
            current: None,
            profiles: BTreeMap::new(),
            next_id: 0,
            scan_policy: ScanPolicy::default(),
            driver_ssid: None,
            signal: None,
            scan_results: Vec::new(),
            scan_status: 0,
            access_point: None,
            script: None,
            epoch: 0,
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                state_rx,
                disconnects: AtomicUsize::new(0),
                signal_polls: AtomicUsize::new(0),
            }),
        }
    }

    /// Complete the association with `bssid` on `freq` MHz, `delay` after
    /// each `select_network`. Without this the engine stays scanning.
    pub fn complete_after(&self, delay: Duration, bssid: MacAddr, freq: u32) {
        self.shared.state().script = Some(Script { delay, bssid, freq });
    }

    /// Force the connection state.
    pub fn set_state(&self, state: WpaState) {
        self.shared.state().publish(state);
    }

    /// Force an association record for the selected profile.
    pub fn set_link(&self, state: WpaState, bssid: MacAddr, freq: u32) {
        let mut sim = self.shared.state();
        sim.bssid = bssid;
        sim.assoc_freq = freq;
        sim.publish(state);
    }

    /// SSID the driver reports.
    pub fn set_driver_ssid(&self, ssid: Option<Vec<u8>>) {
        self.shared.state().driver_ssid = ssid;
    }

    /// Signal reading returned by `signal_poll`; `None` makes it fail.
    pub fn set_signal(&self, signal: Option<SignalInfo>) {
        self.shared.state().signal = signal;
    }

    /// Results and final status returned by the next scans.
    pub fn set_scan_results(&self, entries: Vec<ScanEntry>, status: i32) {
        let mut sim = self.shared.state();
        sim.scan_results = entries;
        sim.scan_status = status;
    }

    /// Close the state channel, as when the engine goes away.
    pub fn shutdown(&self) {
        self.shared.state().tx = None;
    }

    /// Number of disconnection requests received.
    pub fn disconnect_count(&self) -> usize {
        self.shared.disconnects.load(Ordering::SeqCst)
    }

    /// Number of signal polls received.
    pub fn signal_poll_count(&self) -> usize {
        self.shared.signal_polls.load(Ordering::SeqCst)
    }

    /// Every stored profile.
    pub fn networks(&self) -> Vec<(NetworkId, NetworkProfile)> {
        self.shared
            .state()
            .profiles
            .iter()
            .map(|(id, profile)| (*id, profile.clone()))
            .collect()
    }

    /// Profile currently selected.
    pub fn selected(&self) -> Option<NetworkId> {
        self.shared.state().current
    }

    /// Scan policy last applied.
    pub fn scan_policy(&self) -> ScanPolicy {
        self.shared.state().scan_policy
    }

    /// Profile of the running access point.
    pub fn access_point(&self) -> Option<NetworkProfile> {
        self.shared.state().access_point.clone()
    }

    fn schedule_completion(&self, script: Script, epoch: u64) {
        let Ok(runtime) = Handle::try_current() else {
            debug!("no runtime, association will not complete");
            return;
        };
        let shared = Arc::clone(&self.shared);
        runtime.spawn(async move {
            tokio::time::sleep(script.delay).await;
            let mut sim = shared.state();
            if sim.epoch != epoch {
                trace!(epoch, "discarding stale association");
                return;
            }
            sim.bssid = script.bssid;
            sim.assoc_freq = script.freq;
            sim.publish(WpaState::Completed);
        });
    }
}

impl Default for SimEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sim = self.shared.state();
        f.debug_struct("SimEngine")
            .field("state", &sim.state)
            .field("current", &sim.current)
            .field("profiles", &sim.profiles.len())
            .finish()
    }
}

impl SupplicantEngine for SimEngine {
    fn add_network(&self, profile: NetworkProfile) -> EngineResult<NetworkId> {
        let mut sim = self.shared.state();
        let id = NetworkId(sim.next_id);
        sim.next_id += 1;
        sim.profiles.insert(id, profile);
        Ok(id)
    }

    fn update_network(&self, id: NetworkId, profile: NetworkProfile) -> EngineResult<()> {
        *self.shared.state().profile_mut(id)? = profile;
        Ok(())
    }

    fn network(&self, id: NetworkId) -> Option<NetworkProfile> {
        self.shared.state().profiles.get(&id).cloned()
    }

    fn enable_network(&self, id: NetworkId) -> EngineResult<()> {
        self.shared.state().profile_mut(id)?.disabled = false;
        Ok(())
    }

    fn disable_network(&self, id: NetworkId) -> EngineResult<()> {
        self.shared.state().profile_mut(id)?.disabled = true;
        Ok(())
    }

    fn remove_network(&self, id: NetworkId) -> EngineResult<()> {
        let mut sim = self.shared.state();
        sim.profiles
            .remove(&id)
            .ok_or(EngineError::UnknownNetwork(id))?;
        if sim.current == Some(id) {
            sim.current = None;
        }
        Ok(())
    }

    fn select_network(&self, id: NetworkId) -> EngineResult<()> {
        let (script, epoch) = {
            let mut sim = self.shared.state();
            sim.profile_mut(id)?.disabled = false;
            sim.current = Some(id);
            sim.epoch += 1;
            sim.bssid = MacAddr::ZERO;
            sim.assoc_freq = 0;
            sim.publish(WpaState::Scanning);
            (sim.script, sim.epoch)
        };
        if let Some(script) = script {
            self.schedule_completion(script, epoch);
        }
        Ok(())
    }

    fn set_scan_policy(&self, policy: ScanPolicy) {
        self.shared.state().scan_policy = policy;
    }

    fn request_disconnection(&self) {
        self.shared.disconnects.fetch_add(1, Ordering::SeqCst);
        let mut sim = self.shared.state();
        sim.epoch += 1;
        sim.current = None;
        sim.bssid = MacAddr::ZERO;
        sim.assoc_freq = 0;
        sim.publish(WpaState::Disconnected);
    }

    fn watch_state(&self) -> watch::Receiver<WpaState> {
        self.shared.state_rx.clone()
    }

    fn snapshot(&self) -> LinkSnapshot {
        let sim = self.shared.state();
        LinkSnapshot {
            state: sim.state,
            bssid: sim.bssid,
            assoc_freq: sim.assoc_freq,
            current: sim.current.and_then(|id| sim.profiles.get(&id).cloned()),
        }
    }

    fn driver_ssid(&self) -> Option<Vec<u8>> {
        self.shared.state().driver_ssid.clone()
    }

    fn signal_poll(&self) -> EngineResult<SignalInfo> {
        self.shared.signal_polls.fetch_add(1, Ordering::SeqCst);
        self.shared
            .state()
            .signal
            .ok_or_else(|| EngineError::Driver("signal poll failed".into()))
    }

    fn scan(&self, mut callback: ScanCallback) -> EngineResult<()> {
        let (entries, status) = {
            let sim = self.shared.state();
            if sim.tx.is_none() {
                return Err(EngineError::Unavailable);
            }
            (sim.scan_results.clone(), sim.scan_status)
        };
        for entry in entries {
            callback(ScanReport::Entry(entry));
        }
        callback(ScanReport::Done { status });
        Ok(())
    }

    fn start_ap(&self, profile: NetworkProfile) -> EngineResult<()> {
        let mut sim = self.shared.state();
        if sim.tx.is_none() {
            return Err(EngineError::Unavailable);
        }
        sim.access_point = Some(profile);
        Ok(())
    }

    fn stop_ap(&self) -> EngineResult<()> {
        self.shared
            .state()
            .access_point
            .take()
            .map(|_| ())
            .ok_or_else(|| EngineError::Driver("access point not running".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Ssid;
    use crate::engine::KeyMgmt;

    const BSSID: MacAddr = MacAddr::new([0x02, 0x11, 0x22, 0x33, 0x44, 0x55]);

    fn profile() -> NetworkProfile {
        NetworkProfile::station(Ssid::new(b"home-net".to_vec()).unwrap(), KeyMgmt::Psk)
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_completes_after_delay() {
        let engine = SimEngine::new();
        engine.complete_after(Duration::from_secs(3), BSSID, 2437);
        let mut state = engine.watch_state();

        let id = engine.add_network(profile()).unwrap();
        engine.select_network(id).unwrap();
        assert_eq!(engine.state(), WpaState::Scanning);

        let start = tokio::time::Instant::now();
        state.wait_for(|s| s.is_completed()).await.unwrap();
        assert_eq!(start.elapsed(), Duration::from_secs(3));

        let snapshot = engine.snapshot();
        assert_eq!(snapshot.bssid, BSSID);
        assert_eq!(snapshot.assoc_freq, 2437);
        assert!(!snapshot.current.unwrap().disabled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disconnect_discards_pending_association() {
        let engine = SimEngine::new();
        engine.complete_after(Duration::from_secs(1), BSSID, 2437);

        let id = engine.add_network(profile()).unwrap();
        engine.select_network(id).unwrap();
        engine.request_disconnection();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(engine.state(), WpaState::Disconnected);
        assert_eq!(engine.disconnect_count(), 1);
        assert_eq!(engine.selected(), None);
    }

    #[tokio::test]
    async fn test_shutdown_closes_state_channel() {
        let engine = SimEngine::new();
        let mut state = engine.watch_state();
        engine.shutdown();
        assert!(state.changed().await.is_err());
        assert_eq!(
            engine.scan(Box::new(|_| {})).unwrap_err(),
            EngineError::Unavailable
        );
    }

    #[test]
    fn test_profile_bookkeeping() {
        let engine = SimEngine::new();
        let id = engine.add_network(profile()).unwrap();
        assert!(engine.network(id).unwrap().disabled);

        engine.enable_network(id).unwrap();
        assert!(!engine.network(id).unwrap().disabled);
        engine.disable_network(id).unwrap();
        assert!(engine.network(id).unwrap().disabled);

        engine.remove_network(id).unwrap();
        assert_eq!(
            engine.remove_network(id).unwrap_err(),
            EngineError::UnknownNetwork(id)
        );
        assert!(engine.networks().is_empty());
    }

    #[test]
    fn test_scan_reports_entries_then_done() {
        let engine = SimEngine::new();
        let entry = ScanEntry {
            ssid: b"cafe".to_vec(),
            bssid: BSSID,
            channel: 6,
            band: None,
            security: KeyMgmt::None,
            mfp: Default::default(),
            rssi: -61,
        };
        engine.set_scan_results(vec![entry.clone()], 0);

        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        engine
            .scan(Box::new(move |report| sink.lock().unwrap().push(report)))
            .unwrap();

        let reports = reports.lock().unwrap();
        assert_eq!(
            *reports,
            vec![ScanReport::Entry(entry), ScanReport::Done { status: 0 }]
        );
    }

    #[test]
    fn test_signal_poll_counts() {
        let engine = SimEngine::new();
        assert!(engine.signal_poll().is_err());
        engine.set_signal(Some(SignalInfo { current_signal: -48 }));
        assert_eq!(engine.signal_poll().unwrap().current_signal, -48);
        assert_eq!(engine.signal_poll_count(), 2);
    }
}
