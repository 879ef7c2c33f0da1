//! Device session records and the session store contract.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::lorawan::region::MAX_FCNT_GAP;
use crate::lorawan::types::{AesKey, DevAddr, DevEui};

/// Authoritative state for one activated device.
///
/// The session store owns the persisted record; components hold only
/// request-scoped copies. Exactly one live session exists per DevEui.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DeviceSession {
    pub dev_eui: DevEui,
    pub dev_addr: DevAddr,
    pub nwk_s_key: AesKey,

    /// Next expected uplink counter.
    pub fcnt_up: u32,
    /// Counter of the next downlink frame to be scheduled.
    pub fcnt_down: u32,
    /// Disables strict uplink counter validation for devices that do not
    /// track counters reliably.
    pub skip_fcnt_check: bool,

    /// Enabled uplink channel indices, seeded from the regional plan.
    pub enabled_channels: Vec<usize>,
    /// Extra channel frequencies in Hz, from the device profile's
    /// factory presets.
    pub channel_frequencies: Vec<u32>,

    pub device_profile_id: String,
    pub service_profile_id: String,
    pub routing_profile_id: String,
}

impl DeviceSession {
    /// Reconstruct the full uplink counter from a 16-bit truncated one and
    /// validate it against the session.
    ///
    /// Returns the accepted full counter, or `None` when the value would
    /// regress or repeat an already-accepted counter (replay). With
    /// `skip_fcnt_check` set the received value is accepted as-is.
    pub fn full_fcnt_up(&self, received: u32) -> Option<u32> {
        if self.skip_fcnt_check {
            return Some(received);
        }
        let gap = u32::from((received as u16).wrapping_sub(self.fcnt_up as u16));
        if gap < MAX_FCNT_GAP {
            Some(self.fcnt_up.wrapping_add(gap))
        } else {
            None
        }
    }
}

/// Durable keyed storage for session records.
///
/// `put` is a full overwrite by DevEui (last writer wins). `addr_in_use`
/// backs the allocator's liveness check; record retrieval by address stays
/// out of this contract.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, dev_eui: DevEui) -> Result<DeviceSession>;
    async fn put(&self, session: DeviceSession) -> Result<()>;
    async fn delete(&self, dev_eui: DevEui) -> Result<()>;
    async fn addr_in_use(&self, dev_addr: DevAddr) -> Result<bool>;
}

/// In-process session store. Reference implementation of the contract's
/// key-level semantics; also the test backend.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<DevEui, DeviceSession>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn get(&self, dev_eui: DevEui) -> Result<DeviceSession> {
        self.sessions
            .read()
            .get(&dev_eui)
            .cloned()
            .ok_or(Error::SessionNotFound(dev_eui))
    }

    async fn put(&self, session: DeviceSession) -> Result<()> {
        self.sessions.write().insert(session.dev_eui, session);
        Ok(())
    }

    async fn delete(&self, dev_eui: DevEui) -> Result<()> {
        match self.sessions.write().remove(&dev_eui) {
            Some(_) => Ok(()),
            None => Err(Error::SessionNotFound(dev_eui)),
        }
    }

    async fn addr_in_use(&self, dev_addr: DevAddr) -> Result<bool> {
        Ok(self
            .sessions
            .read()
            .values()
            .any(|s| s.dev_addr == dev_addr))
    }
}

#[cfg(test)]
pub(crate) fn test_session(dev_eui: DevEui, dev_addr: DevAddr) -> DeviceSession {
    DeviceSession {
        dev_eui,
        dev_addr,
        nwk_s_key: AesKey::default(),
        fcnt_up: 0,
        fcnt_down: 0,
        skip_fcnt_check: false,
        enabled_channels: vec![0, 1, 2],
        channel_frequencies: vec![],
        device_profile_id: "dp-test".into(),
        service_profile_id: "sp-test".into(),
        routing_profile_id: "rp-test".into(),
    }
}
