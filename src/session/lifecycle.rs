//! Session lifecycle: activation, deactivation, activation read-back.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::lorawan::region::{mhz_to_hz, ChannelPlan};
use crate::lorawan::types::{AesKey, DevAddr, DevEui};
use crate::session::locks::DeviceLocks;
use crate::storage::{
    bounded, CommandQueueStore, DeviceProfileStore, DeviceSession, DeviceStore, SessionStore,
};

/// Caller-supplied inputs to an ABP-style activation.
#[derive(Debug, Clone)]
pub struct ActivationParams {
    pub dev_eui: DevEui,
    pub dev_addr: DevAddr,
    pub nwk_s_key: AesKey,
    pub fcnt_up: u32,
    pub fcnt_down: u32,
    pub skip_fcnt_check: bool,
}

/// Current activation state of a device, as returned to the caller.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Activation {
    pub dev_addr: DevAddr,
    pub nwk_s_key: AesKey,
    pub fcnt_up: u32,
    pub fcnt_down: u32,
    pub skip_fcnt_check: bool,
}

/// Creates, reads and destroys session records. The only state it touches
/// is the session store and the command queue.
pub struct SessionManager {
    sessions: Arc<dyn SessionStore>,
    queue_store: Arc<dyn CommandQueueStore>,
    devices: Arc<dyn DeviceStore>,
    profiles: Arc<dyn DeviceProfileStore>,
    channel_plan: ChannelPlan,
    locks: Arc<DeviceLocks>,
    op_timeout: Duration,
}

impl SessionManager {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sessions: Arc<dyn SessionStore>,
        queue_store: Arc<dyn CommandQueueStore>,
        devices: Arc<dyn DeviceStore>,
        profiles: Arc<dyn DeviceProfileStore>,
        channel_plan: ChannelPlan,
        locks: Arc<DeviceLocks>,
        op_timeout: Duration,
    ) -> Self {
        Self {
            sessions,
            queue_store,
            devices,
            profiles,
            channel_plan,
            locks,
            op_timeout,
        }
    }

    /// Build and persist a session from the activation inputs and the
    /// device's profile, overwriting any prior session for the DevEui, and
    /// discard every queued MAC-command block.
    ///
    /// A flush failure after the session write is surfaced as an error:
    /// the store offers no cross-key transaction, so the caller must treat
    /// a failed activation as requiring a reconciliation check rather than
    /// assuming a rollback.
    pub async fn activate(&self, params: ActivationParams) -> Result<()> {
        let device = bounded(
            "device store get",
            self.op_timeout,
            self.devices.get(params.dev_eui),
        )
        .await?;

        let profile = bounded(
            "device-profile store get",
            self.op_timeout,
            self.profiles.get(&device.device_profile_id),
        )
        .await?;

        let session = DeviceSession {
            dev_eui: params.dev_eui,
            dev_addr: params.dev_addr,
            nwk_s_key: params.nwk_s_key,
            fcnt_up: params.fcnt_up,
            fcnt_down: params.fcnt_down,
            skip_fcnt_check: params.skip_fcnt_check,
            enabled_channels: self.channel_plan.enabled_uplink_channels(),
            channel_frequencies: profile
                .factory_preset_freqs_mhz
                .iter()
                .map(|&mhz| mhz_to_hz(mhz))
                .collect(),
            device_profile_id: device.device_profile_id,
            service_profile_id: device.service_profile_id,
            routing_profile_id: device.routing_profile_id,
        };

        let _guard = self.locks.acquire(params.dev_eui).await;

        bounded(
            "session store put",
            self.op_timeout,
            self.sessions.put(session),
        )
        .await?;

        // Blocks queued against the previous session must never reach the
        // new one.
        bounded(
            "command queue clear",
            self.op_timeout,
            self.queue_store.clear(params.dev_eui),
        )
        .await?;

        tracing::info!(
            dev_eui = %params.dev_eui,
            dev_addr = %params.dev_addr,
            fcnt_up = params.fcnt_up,
            fcnt_down = params.fcnt_down,
            "device activated"
        );
        Ok(())
    }

    /// Delete the session record and any queued blocks. Deleting an
    /// already-absent session surfaces the store's `NotFound`; callers may
    /// treat that the same as success.
    pub async fn deactivate(&self, dev_eui: DevEui) -> Result<()> {
        let _guard = self.locks.acquire(dev_eui).await;

        bounded(
            "command queue clear",
            self.op_timeout,
            self.queue_store.clear(dev_eui),
        )
        .await?;

        bounded(
            "session store delete",
            self.op_timeout,
            self.sessions.delete(dev_eui),
        )
        .await?;

        tracing::info!(dev_eui = %dev_eui, "device deactivated");
        Ok(())
    }

    /// Current activation state, or `NotFound` when no session exists.
    pub async fn get_activation(&self, dev_eui: DevEui) -> Result<Activation> {
        let session = bounded(
            "session store get",
            self.op_timeout,
            self.sessions.get(dev_eui),
        )
        .await?;

        Ok(Activation {
            dev_addr: session.dev_addr,
            nwk_s_key: session.nwk_s_key,
            fcnt_up: session.fcnt_up,
            fcnt_down: session.fcnt_down,
            skip_fcnt_check: session.skip_fcnt_check,
        })
    }
}
