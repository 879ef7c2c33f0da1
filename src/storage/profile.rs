//! Device inventory and device-profile records consumed by activation.
//!
//! The administrative surface that creates these records lives outside
//! this core; activation only reads them.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::lorawan::types::DevEui;

/// Provisioned device and its profile references.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Device {
    pub dev_eui: DevEui,
    pub device_profile_id: String,
    pub service_profile_id: String,
    pub routing_profile_id: String,
}

/// The slice of a device profile the activation path reads.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceProfile {
    pub id: String,
    /// Factory-preset channel frequencies in MHz.
    pub factory_preset_freqs_mhz: Vec<f64>,
    pub supports_class_c: bool,
    pub mac_version: String,
}

#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn get(&self, dev_eui: DevEui) -> Result<Device>;
}

#[async_trait]
pub trait DeviceProfileStore: Send + Sync {
    async fn get(&self, id: &str) -> Result<DeviceProfile>;
}

#[derive(Default)]
pub struct MemoryDeviceStore {
    devices: RwLock<HashMap<DevEui, Device>>,
}

impl MemoryDeviceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, device: Device) {
        self.devices.write().insert(device.dev_eui, device);
    }
}

#[async_trait]
impl DeviceStore for MemoryDeviceStore {
    async fn get(&self, dev_eui: DevEui) -> Result<Device> {
        self.devices
            .read()
            .get(&dev_eui)
            .cloned()
            .ok_or(Error::DeviceNotFound(dev_eui))
    }
}

#[derive(Default)]
pub struct MemoryDeviceProfileStore {
    profiles: RwLock<HashMap<String, DeviceProfile>>,
}

impl MemoryDeviceProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, profile: DeviceProfile) {
        self.profiles.write().insert(profile.id.clone(), profile);
    }
}

#[async_trait]
impl DeviceProfileStore for MemoryDeviceProfileStore {
    async fn get(&self, id: &str) -> Result<DeviceProfile> {
        self.profiles
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::ProfileNotFound(id.to_string()))
    }
}
