//! Lifecycle worker: one task per accepted operation.
//!
//! A worker first waits for the worker it replaced to exit, then watches the
//! engine until the operation ends. The outcome is emitted under the
//! controller's slot lock, only if the worker's generation is still current,
//! so a superseded worker never reports anything.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::DEFAULT_CONNECTION_TIMEOUT;
use crate::engine::{NetworkId, SupplicantEngine};

use super::config::StaleProfilePolicy;
use super::controller::ControllerShared;
use super::events::SupplicantEvent;
use super::operation::{
    ConnectionOutcome, FailureReason, OperationKind, OperationPhase, OutcomeStatus,
    PendingOperation,
};

/// How the wait on the engine ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Waited {
    Completed,
    TimedOut,
    EngineGone,
}

impl Waited {
    /// Terminal phase and reported status.
    fn conclude(self) -> (OperationPhase, OutcomeStatus) {
        match self {
            Waited::Completed => (OperationPhase::Completed, OutcomeStatus::Success),
            Waited::TimedOut => (
                OperationPhase::TimedOut,
                OutcomeStatus::Failure(FailureReason::Timeout),
            ),
            Waited::EngineGone => (
                OperationPhase::Aborted,
                OutcomeStatus::Failure(FailureReason::EngineUnavailable),
            ),
        }
    }
}

pub(super) struct Worker {
    pub(super) op: PendingOperation,
    pub(super) engine: Arc<dyn SupplicantEngine>,
    /// Profile created by a connect.
    pub(super) network: Option<NetworkId>,
    pub(super) stale_profile: StaleProfilePolicy,
    pub(super) cancel: CancellationToken,
    pub(super) previous: Option<JoinHandle<()>>,
    pub(super) shared: Arc<ControllerShared>,
}

impl Worker {
    pub(super) async fn run(mut self) {
        if let Some(previous) = self.previous.take() {
            if let Err(e) = previous.await {
                warn!(device = %self.op.device, error = %e, "previous worker did not exit cleanly");
            }
        }

        if !self.shared.advance(&self.op, OperationPhase::Polling) {
            debug!(device = %self.op.device, generation = self.op.generation, "superseded before polling");
            return;
        }

        let waited = match self.op.kind {
            OperationKind::Disconnect => Waited::Completed,
            OperationKind::Connect => {
                // `timeout` saturates to a far-future deadline on overflow.
                let budget = self.op.timeout.unwrap_or(DEFAULT_CONNECTION_TIMEOUT);
                let mut state = self.engine.watch_state();
                let completed = async { state.wait_for(|s| s.is_completed()).await.map(|_| ()) };

                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => {
                        debug!(
                            device = %self.op.device,
                            generation = self.op.generation,
                            phase = ?OperationPhase::Superseded,
                            "worker cancelled"
                        );
                        return;
                    }
                    waited = timeout(budget, completed) => match waited {
                        Ok(Ok(())) => Waited::Completed,
                        Ok(Err(_)) => Waited::EngineGone,
                        Err(_) => Waited::TimedOut,
                    },
                }
            }
        };

        self.finish(waited);
    }

    fn finish(self, waited: Waited) {
        let (phase, status) = waited.conclude();
        let outcome = ConnectionOutcome {
            device: self.op.device.clone(),
            kind: self.op.kind,
            status,
        };

        let settled = self.shared.settle(&self.op, || {
            if phase == OperationPhase::TimedOut {
                warn!(
                    device = %self.op.device,
                    timeout = ?self.op.timeout,
                    "connect timed out, disconnecting"
                );
                self.engine.request_disconnection();
                self.retire_profile();
            }
            SupplicantEvent::from_outcome(outcome.clone())
        });

        if settled {
            info!(
                device = %outcome.device,
                kind = %outcome.kind,
                status = ?outcome.status,
                ?phase,
                "operation finished"
            );
        } else {
            debug!(device = %outcome.device, generation = self.op.generation, "superseded before settling");
        }
    }

    fn retire_profile(&self) {
        let Some(network) = self.network else {
            return;
        };
        let result = match self.stale_profile {
            StaleProfilePolicy::Keep => return,
            StaleProfilePolicy::Disable => self.engine.disable_network(network),
            StaleProfilePolicy::Remove => self.engine.remove_network(network),
        };
        if let Err(e) = result {
            warn!(network = %network, error = %e, "failed to retire timed-out profile");
        }
    }
}
