//! Pending network-initiated MAC commands, one queue per device.
//!
//! Blocks wait here until the downlink-flow collaborator drains them into
//! an outgoing frame. The only mutation rules are replacement-by-CID on
//! enqueue and the unconditional flush on (re)activation or deactivation.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::lorawan::commands::{Cid, MacCommand};
use crate::lorawan::types::DevEui;
use crate::session::locks::DeviceLocks;
use crate::storage::{bounded, CommandQueueStore};

/// One unit of network-initiated signaling awaiting transmission.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MacCommandBlock {
    /// Replacement key: a device's queue holds at most one block per CID.
    pub cid: Cid,
    /// Raw payload when the block is opaque to this core (commands that
    /// travel encrypted in FRMPayload).
    pub frm_payload: Vec<u8>,
    /// Decoded commands when the content is visible to this core.
    pub commands: Vec<MacCommand>,
    /// Whether an external caller submitted the block, as opposed to an
    /// internally generated one.
    pub external: bool,
}

/// Per-device ordered queue with dedup-by-CID replacement.
pub struct MacCommandQueue {
    store: Arc<dyn CommandQueueStore>,
    locks: Arc<DeviceLocks>,
    op_timeout: Duration,
}

impl MacCommandQueue {
    pub fn new(
        store: Arc<dyn CommandQueueStore>,
        locks: Arc<DeviceLocks>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            store,
            locks,
            op_timeout,
        }
    }

    /// Insert `block`, replacing any pending block with the same CID. The
    /// replaced entry's slot is not kept: the new block goes to the tail,
    /// other entries keep their order. The updated queue is written back
    /// in a single store call.
    pub async fn enqueue(&self, dev_eui: DevEui, block: MacCommandBlock) -> Result<()> {
        let _guard = self.locks.acquire(dev_eui).await;

        let mut blocks = bounded(
            "command queue load",
            self.op_timeout,
            self.store.load(dev_eui),
        )
        .await?;

        let replacing = blocks.iter().any(|b| b.cid == block.cid);
        blocks.retain(|b| b.cid != block.cid);
        blocks.push(block);

        bounded(
            "command queue store",
            self.op_timeout,
            self.store.store(dev_eui, blocks),
        )
        .await?;

        if replacing {
            tracing::debug!(dev_eui = %dev_eui, "replaced pending mac-command block");
        }
        Ok(())
    }

    /// Drop every pending block for a device.
    pub async fn flush_all(&self, dev_eui: DevEui) -> Result<()> {
        let _guard = self.locks.acquire(dev_eui).await;
        bounded(
            "command queue clear",
            self.op_timeout,
            self.store.clear(dev_eui),
        )
        .await
    }

    /// Current queue contents, in transmission order. Draining belongs to
    /// the downlink-flow collaborator; this is its read path.
    pub async fn pending(&self, dev_eui: DevEui) -> Result<Vec<MacCommandBlock>> {
        bounded(
            "command queue load",
            self.op_timeout,
            self.store.load(dev_eui),
        )
        .await
    }
}
