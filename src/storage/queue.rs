//! Persistence contract for per-device MAC-command queues.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::Result;
use crate::lorawan::types::DevEui;
use crate::maccommand::MacCommandBlock;

/// Keyed storage for pending command blocks.
///
/// `store` replaces the whole queue for a device in one write; there is no
/// partial-write state. Loading or clearing an absent queue is not an
/// error: an empty queue and no queue are indistinguishable.
#[async_trait]
pub trait CommandQueueStore: Send + Sync {
    async fn load(&self, dev_eui: DevEui) -> Result<Vec<MacCommandBlock>>;
    async fn store(&self, dev_eui: DevEui, blocks: Vec<MacCommandBlock>) -> Result<()>;
    async fn clear(&self, dev_eui: DevEui) -> Result<()>;
}

/// In-process queue store backing tests and embedded use.
#[derive(Default)]
pub struct MemoryCommandQueueStore {
    queues: RwLock<HashMap<DevEui, Vec<MacCommandBlock>>>,
}

impl MemoryCommandQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CommandQueueStore for MemoryCommandQueueStore {
    async fn load(&self, dev_eui: DevEui) -> Result<Vec<MacCommandBlock>> {
        Ok(self.queues.read().get(&dev_eui).cloned().unwrap_or_default())
    }

    async fn store(&self, dev_eui: DevEui, blocks: Vec<MacCommandBlock>) -> Result<()> {
        self.queues.write().insert(dev_eui, blocks);
        Ok(())
    }

    async fn clear(&self, dev_eui: DevEui) -> Result<()> {
        self.queues.write().remove(&dev_eui);
        Ok(())
    }
}
