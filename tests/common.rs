//! Common test harness utilities for integration tests.
//!
//! Provides a fully wired control plane over in-memory stores, a
//! controllable downlink-flow stub, and fixture builders.

// Not all test files use all helpers; silence dead_code warnings for unused exports.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use loraplane::downlink::{DownlinkFlow, ProprietaryDownlink};
use loraplane::storage::{
    Device, DeviceProfile, DeviceSession, MemoryCommandQueueStore, MemoryDeviceProfileStore,
    MemoryDeviceStore, MemorySessionStore, SessionStore,
};
use loraplane::{Config, ControlPlane, ControlPlaneInputs, DevEui, Result};

/// Downlink-flow stub. Records every push; when built with
/// `advancing_counter`, it also bumps the stored downlink counter the way
/// the real flow does once a frame is committed to the radio path.
pub struct StubFlow {
    sessions: Arc<MemorySessionStore>,
    advance_counter: bool,
    pub unicasts: Mutex<Vec<RecordedUnicast>>,
    pub proprietary: Mutex<Vec<ProprietaryDownlink>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUnicast {
    pub dev_eui: DevEui,
    pub fcnt_down: u32,
    pub confirmed: bool,
    pub port: u8,
    pub payload: Vec<u8>,
}

impl StubFlow {
    fn new(sessions: Arc<MemorySessionStore>, advance_counter: bool) -> Self {
        Self {
            sessions,
            advance_counter,
            unicasts: Mutex::new(vec![]),
            proprietary: Mutex::new(vec![]),
        }
    }

    pub fn unicast_count(&self) -> usize {
        self.unicasts.lock().len()
    }
}

#[async_trait]
impl DownlinkFlow for StubFlow {
    async fn push_unicast(
        &self,
        session: &DeviceSession,
        confirmed: bool,
        port: u8,
        payload: &[u8],
    ) -> Result<()> {
        self.unicasts.lock().push(RecordedUnicast {
            dev_eui: session.dev_eui,
            fcnt_down: session.fcnt_down,
            confirmed,
            port,
            payload: payload.to_vec(),
        });
        if self.advance_counter {
            let mut updated = session.clone();
            updated.fcnt_down += 1;
            self.sessions.put(updated).await?;
        }
        Ok(())
    }

    async fn push_proprietary(&self, downlink: &ProprietaryDownlink) -> Result<()> {
        self.proprietary.lock().push(downlink.clone());
        Ok(())
    }
}

/// A wired control plane plus handles on its backing stores and flow.
pub struct Harness {
    pub control: ControlPlane,
    pub sessions: Arc<MemorySessionStore>,
    pub command_queue: Arc<MemoryCommandQueueStore>,
    pub devices: Arc<MemoryDeviceStore>,
    pub profiles: Arc<MemoryDeviceProfileStore>,
    pub flow: Arc<StubFlow>,
}

pub fn test_config() -> Config {
    Config::from_toml_str(
        r#"
[network]
net_id = "000013"
region = "eu868"

[devaddr]
alloc_attempts = 10
"#,
    )
    .expect("test config")
}

/// Route core logs into the captured test output. Safe to call from every
/// test; only the first call installs the subscriber.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Build a control plane over fresh in-memory stores. `advancing_counter`
/// selects whether the stubbed flow commits frames (advancing the stored
/// downlink counter) or leaves the counter untouched.
pub fn harness(advancing_counter: bool) -> Harness {
    init_tracing();
    let sessions = Arc::new(MemorySessionStore::new());
    let command_queue = Arc::new(MemoryCommandQueueStore::new());
    let devices = Arc::new(MemoryDeviceStore::new());
    let profiles = Arc::new(MemoryDeviceProfileStore::new());
    let flow = Arc::new(StubFlow::new(sessions.clone(), advancing_counter));

    let control = ControlPlane::new(
        &test_config(),
        ControlPlaneInputs {
            sessions: sessions.clone(),
            command_queue: command_queue.clone(),
            devices: devices.clone(),
            profiles: profiles.clone(),
            downlink_flow: flow.clone(),
        },
    );

    Harness {
        control,
        sessions,
        command_queue,
        devices,
        profiles,
        flow,
    }
}

pub fn dev_eui(n: u8) -> DevEui {
    DevEui::from_bytes([0, 0, 0, 0, 0, 0, 0, n])
}

/// Provision a device and its profile so activation can resolve them.
pub fn provision_device(harness: &Harness, dev_eui: DevEui) {
    harness.devices.insert(Device {
        dev_eui,
        device_profile_id: "dp-1".into(),
        service_profile_id: "sp-1".into(),
        routing_profile_id: "rp-1".into(),
    });
    harness.profiles.insert(DeviceProfile {
        id: "dp-1".into(),
        factory_preset_freqs_mhz: vec![867.1, 867.3, 867.5],
        supports_class_c: true,
        mac_version: "1.0.2".into(),
    });
}
