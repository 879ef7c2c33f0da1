//! Per-device serialization.
//!
//! The core does not rely on store-level compare-and-swap; instead every
//! operation that reads or mutates one device's state runs under that
//! device's async mutex. Two dispatches for the same device can therefore
//! never observe the same downlink counter and both succeed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::lorawan::types::DevEui;

/// Registry of per-device locks.
///
/// Entries are created on first use and kept for the life of the registry;
/// growth is bounded by the size of the device fleet. Dropping an entry
/// while a guard is outstanding would let a second lock be minted for the
/// same device, so entries are never evicted.
#[derive(Default)]
pub struct DeviceLocks {
    inner: parking_lot::Mutex<HashMap<DevEui, Arc<Mutex<()>>>>,
}

impl DeviceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one device, waiting behind any in-flight
    /// operation for the same DevEui.
    pub async fn acquire(&self, dev_eui: DevEui) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock();
            map.entry(dev_eui).or_default().clone()
        };
        lock.lock_owned().await
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
