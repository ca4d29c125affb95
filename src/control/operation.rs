//! In-flight lifecycle operations and their outcomes.

use std::fmt;
use std::time::Duration;

use crate::core::{DeviceId, ErrorKind, STATUS_FAILURE, STATUS_SUCCESS};

/// Kind of lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Associate with a network.
    Connect,
    /// Drop the association.
    Disconnect,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Connect => f.write_str("connect"),
            OperationKind::Disconnect => f.write_str("disconnect"),
        }
    }
}

/// Lifecycle of an operation as seen by its worker.
///
/// `Started -> Polling -> {Completed | TimedOut | Aborted | Superseded}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationPhase {
    /// Accepted, worker not yet observing engine state.
    Started,
    /// Worker is waiting for the engine.
    Polling,
    /// The engine reached a terminal state.
    Completed,
    /// The budget ran out.
    TimedOut,
    /// The engine went away before reaching a terminal state.
    Aborted,
    /// A newer operation on the same device replaced this one.
    Superseded,
}

impl OperationPhase {
    /// Whether this phase ends the operation.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OperationPhase::Completed
                | OperationPhase::TimedOut
                | OperationPhase::Aborted
                | OperationPhase::Superseded
        )
    }
}

/// The single in-flight operation of a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingOperation {
    /// Device the operation runs on.
    pub device: DeviceId,
    /// What the operation does.
    pub kind: OperationKind,
    /// Completion budget (connect only).
    pub timeout: Option<Duration>,
    /// Per-device sequence number; a higher one supersedes a lower one.
    pub generation: u64,
    /// Current phase.
    pub phase: OperationPhase,
}

/// Why an accepted operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureReason {
    /// The engine did not reach the terminal state in time.
    Timeout,
    /// The engine went away while the worker was waiting.
    EngineUnavailable,
}

impl FailureReason {
    /// Classify this failure.
    pub fn kind(self) -> ErrorKind {
        match self {
            FailureReason::Timeout => ErrorKind::Timeout,
            FailureReason::EngineUnavailable => ErrorKind::NotFound,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Timeout => f.write_str("timed out"),
            FailureReason::EngineUnavailable => f.write_str("engine unavailable"),
        }
    }
}

/// Success or failure of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeStatus {
    /// Completed.
    Success,
    /// Failed.
    Failure(FailureReason),
}

impl OutcomeStatus {
    /// Status code carried by events: 0 on success, 1 on failure.
    pub fn code(self) -> i32 {
        match self {
            OutcomeStatus::Success => STATUS_SUCCESS,
            OutcomeStatus::Failure(_) => STATUS_FAILURE,
        }
    }

    /// Whether the operation succeeded.
    pub fn is_success(self) -> bool {
        self == OutcomeStatus::Success
    }
}

/// Terminal result of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionOutcome {
    /// Device the operation ran on.
    pub device: DeviceId,
    /// What the operation did.
    pub kind: OperationKind,
    /// How it ended.
    pub status: OutcomeStatus,
}

impl ConnectionOutcome {
    /// Status code: 0 on success, 1 on failure.
    pub fn code(&self) -> i32 {
        self.status.code()
    }

    /// Whether the operation succeeded.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(!OperationPhase::Started.is_terminal());
        assert!(!OperationPhase::Polling.is_terminal());
        assert!(OperationPhase::Completed.is_terminal());
        assert!(OperationPhase::TimedOut.is_terminal());
        assert!(OperationPhase::Aborted.is_terminal());
        assert!(OperationPhase::Superseded.is_terminal());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(OutcomeStatus::Success.code(), 0);
        assert_eq!(OutcomeStatus::Failure(FailureReason::Timeout).code(), 1);
        assert_eq!(
            OutcomeStatus::Failure(FailureReason::EngineUnavailable).code(),
            1
        );

        let outcome = ConnectionOutcome {
            device: DeviceId::from("wlan0"),
            kind: OperationKind::Connect,
            status: OutcomeStatus::Failure(FailureReason::Timeout),
        };
        assert!(!outcome.is_success());
        assert_eq!(outcome.code(), 1);
    }

    #[test]
    fn test_failure_kinds() {
        assert_eq!(FailureReason::Timeout.kind(), ErrorKind::Timeout);
        assert_eq!(FailureReason::Timeout.to_string(), "timed out");
    }
}
