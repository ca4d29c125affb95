//! Controller configuration.

use std::time::Duration;

use crate::core::{DEFAULT_CONNECTION_TIMEOUT, DEFAULT_EVENT_CAPACITY};

use super::error::{ControlError, ControlResult};

/// What happens to the profile of a connect that timed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StaleProfilePolicy {
    /// Leave it stored and selected-on-demand.
    #[default]
    Keep,
    /// Leave it stored but disabled.
    Disable,
    /// Delete it.
    Remove,
}

/// Controller configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Connect timeout when the request does not give a positive one.
    pub default_timeout: Duration,

    /// Handling of timed-out profiles.
    pub stale_profile: StaleProfilePolicy,

    /// Events buffered per subscriber before the slowest one lags.
    pub event_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_CONNECTION_TIMEOUT,
            stale_profile: StaleProfilePolicy::Keep,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl ControllerConfig {
    /// Start a builder from the defaults.
    pub fn builder() -> ControllerConfigBuilder {
        ControllerConfigBuilder::new()
    }
}

/// Builder for [`ControllerConfig`].
#[derive(Debug, Default)]
pub struct ControllerConfigBuilder {
    config: ControllerConfig,
}

impl ControllerConfigBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default connect timeout.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    /// Set the stale-profile policy.
    pub fn stale_profile(mut self, policy: StaleProfilePolicy) -> Self {
        self.config.stale_profile = policy;
        self
    }

    /// Set the event buffer capacity.
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.config.event_capacity = capacity;
        self
    }

    /// Validate and build.
    pub fn build(self) -> ControlResult<ControllerConfig> {
        if self.config.default_timeout.is_zero() {
            return Err(ControlError::Config(
                "default timeout must be positive".into(),
            ));
        }
        if self.config.event_capacity == 0 {
            return Err(ControlError::Config(
                "event capacity must be positive".into(),
            ));
        }
        Ok(self.config)
    }
}
