//! Downlink dispatch: frame-counter gated unicast and session-less
//! proprietary paths.

pub mod flow;

pub use flow::{DownlinkFlow, ProprietaryDownlink};

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::lorawan::types::DevEui;
use crate::session::locks::DeviceLocks;
use crate::storage::{bounded, SessionStore};

/// Validates downlink requests against session state and forwards them to
/// the downlink-flow collaborator. Single-shot: retry policy belongs to
/// the caller or the flow.
pub struct DownlinkDispatcher {
    sessions: Arc<dyn SessionStore>,
    flow: Arc<dyn DownlinkFlow>,
    locks: Arc<DeviceLocks>,
    op_timeout: Duration,
}

impl DownlinkDispatcher {
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        flow: Arc<dyn DownlinkFlow>,
        locks: Arc<DeviceLocks>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            flow,
            locks,
            op_timeout,
        }
    }

    /// Push an application payload to one device.
    ///
    /// `expected_fcnt_down` must equal the session's stored downlink
    /// counter exactly: downlinks are issued in lockstep with the counter
    /// the caller last observed, and a mismatch reports the expected value
    /// so the caller can resynchronize. The counter itself is advanced by
    /// the flow once the frame is committed to the radio path, not here.
    pub async fn push_unicast(
        &self,
        dev_eui: DevEui,
        expected_fcnt_down: u32,
        confirmed: bool,
        port: u8,
        payload: &[u8],
    ) -> Result<()> {
        let _guard = self.locks.acquire(dev_eui).await;

        let session = bounded(
            "session store get",
            self.op_timeout,
            self.sessions.get(dev_eui),
        )
        .await?;

        if expected_fcnt_down != session.fcnt_down {
            tracing::warn!(
                dev_eui = %dev_eui,
                expected = session.fcnt_down,
                got = expected_fcnt_down,
                "rejecting unicast downlink on frame-counter mismatch"
            );
            return Err(Error::InvalidFCnt {
                expected: session.fcnt_down,
            });
        }

        self.flow
            .push_unicast(&session, confirmed, port, payload)
            .await?;

        tracing::debug!(
            dev_eui = %dev_eui,
            fcnt_down = session.fcnt_down,
            confirmed,
            port,
            "unicast downlink forwarded"
        );
        Ok(())
    }

    /// Push a proprietary frame to an explicit gateway set. No session, no
    /// frame counter; failures come only from the flow transport.
    pub async fn push_proprietary(&self, downlink: ProprietaryDownlink) -> Result<()> {
        self.flow.push_proprietary(&downlink).await?;
        tracing::debug!(
            gateways = downlink.gateways.len(),
            frequency = downlink.frequency,
            data_rate = downlink.data_rate,
            "proprietary downlink forwarded"
        );
        Ok(())
    }
}
