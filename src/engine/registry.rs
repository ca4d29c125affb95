//! Lookup of per-device engines.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use crate::core::DeviceId;

use super::traits::SupplicantEngine;

/// Resolves a device to its engine.
pub trait EngineRegistry: Send + Sync {
    /// Engine for `device`, if one is running.
    fn engine(&self, device: &DeviceId) -> Option<Arc<dyn SupplicantEngine>>;
}

/// Registry backed by a map filled by the caller.
#[derive(Default)]
pub struct StaticRegistry {
    engines: RwLock<HashMap<DeviceId, Arc<dyn SupplicantEngine>>>,
}

impl StaticRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `engine` for `device`, returning the engine it replaces.
    pub fn insert(
        &self,
        device: impl Into<DeviceId>,
        engine: Arc<dyn SupplicantEngine>,
    ) -> Option<Arc<dyn SupplicantEngine>> {
        self.engines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(device.into(), engine)
    }

    /// Unregister `device`.
    pub fn remove(&self, device: &DeviceId) -> Option<Arc<dyn SupplicantEngine>> {
        self.engines
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(device)
    }

    /// Registered devices, sorted.
    pub fn devices(&self) -> Vec<DeviceId> {
        let mut devices: Vec<_> = self
            .engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        devices.sort();
        devices
    }
}

impl EngineRegistry for StaticRegistry {
    fn engine(&self, device: &DeviceId) -> Option<Arc<dyn SupplicantEngine>> {
        self.engines
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(device)
            .cloned()
    }
}

impl fmt::Debug for StaticRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticRegistry")
            .field("devices", &self.devices())
            .finish()
    }
}
