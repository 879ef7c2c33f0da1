//! Random device-address allocation inside a network's address block.

use std::sync::Arc;
use std::time::Duration;

use rand::Rng;

use crate::error::{Error, Result};
use crate::lorawan::types::{DevAddr, NetId};
use crate::storage::{bounded, SessionStore};

/// Draws collision-resistant device addresses.
///
/// The liveness check against the session store is best-effort: two
/// allocators racing can still hand out the same address. The store's
/// overwrite-by-DevEui semantics keep that rare collision from silently
/// corrupting either session record; uplink routing detects it when both
/// devices transmit.
pub struct DevAddrAllocator {
    sessions: Arc<dyn SessionStore>,
    attempts: usize,
    op_timeout: Duration,
}

impl DevAddrAllocator {
    pub fn new(sessions: Arc<dyn SessionStore>, attempts: usize, op_timeout: Duration) -> Self {
        Self {
            sessions,
            attempts,
            op_timeout,
        }
    }

    /// Draw a uniformly random address from `net_id`'s block, redrawing on
    /// collision with a live session. Fails with `Exhausted` once the
    /// retry budget is spent.
    pub async fn allocate(&self, net_id: NetId) -> Result<DevAddr> {
        for _ in 0..self.attempts {
            let addr = DevAddr::compose(net_id, rand::thread_rng().gen());
            let in_use = bounded(
                "session store addr_in_use",
                self.op_timeout,
                self.sessions.addr_in_use(addr),
            )
            .await?;
            if !in_use {
                return Ok(addr);
            }
            tracing::debug!("devaddr {addr} already assigned, redrawing");
        }
        tracing::warn!(
            net_id = %net_id,
            attempts = self.attempts,
            "devaddr allocation exhausted its retry budget"
        );
        Err(Error::Exhausted {
            attempts: self.attempts,
        })
    }
}
