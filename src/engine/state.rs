//! Connection state reported by the protocol engine.

use std::fmt;

/// Supplicant connection state.
///
/// Variants are ordered: everything from [`Associated`](WpaState::Associated)
/// upward means the station has an association, and
/// [`Completed`](WpaState::Completed) means keys are installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum WpaState {
    /// Not associated and not trying to.
    #[default]
    Disconnected,
    /// The interface is administratively disabled.
    InterfaceDisabled,
    /// No enabled network to connect to.
    Inactive,
    /// Looking for a network.
    Scanning,
    /// Authentication in progress.
    Authenticating,
    /// Association in progress.
    Associating,
    /// Associated, keys not yet negotiated.
    Associated,
    /// 4-way key handshake in progress.
    FourWayHandshake,
    /// Group key handshake in progress.
    GroupHandshake,
    /// Associated and keys installed.
    Completed,
}

impl WpaState {
    /// At least associated.
    pub fn is_associated(self) -> bool {
        self >= WpaState::Associated
    }

    /// Associated with keys installed.
    pub fn is_completed(self) -> bool {
        self == WpaState::Completed
    }

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            WpaState::Disconnected => "DISCONNECTED",
            WpaState::InterfaceDisabled => "INTERFACE_DISABLED",
            WpaState::Inactive => "INACTIVE",
            WpaState::Scanning => "SCANNING",
            WpaState::Authenticating => "AUTHENTICATING",
            WpaState::Associating => "ASSOCIATING",
            WpaState::Associated => "ASSOCIATED",
            WpaState::FourWayHandshake => "4WAY_HANDSHAKE",
            WpaState::GroupHandshake => "GROUP_HANDSHAKE",
            WpaState::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for WpaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_ordering() {
        assert!(WpaState::Scanning < WpaState::Associated);
        assert!(WpaState::FourWayHandshake > WpaState::Associated);
        assert!(WpaState::Completed > WpaState::GroupHandshake);
    }

    #[test]
    fn test_associated_threshold() {
        assert!(!WpaState::Associating.is_associated());
        assert!(WpaState::Associated.is_associated());
        assert!(WpaState::Completed.is_associated());

        assert!(!WpaState::GroupHandshake.is_completed());
        assert!(WpaState::Completed.is_completed());
    }

    #[test]
    fn test_display() {
        assert_eq!(WpaState::FourWayHandshake.to_string(), "4WAY_HANDSHAKE");
        assert_eq!(WpaState::default(), WpaState::Disconnected);
    }
}
