//! The control-plane facade: one constructor-injected entry point wiring
//! session lifecycle, address allocation, the MAC-command queue and
//! downlink dispatch over shared stores.

pub mod api;

pub use api::{
    ActivateDeviceRequest, AllocateDevAddrRequest, AllocateDevAddrResponse,
    DeactivateDeviceRequest, EnqueueMacCommandRequest, GetActivationRequest,
    GetActivationResponse, PushProprietaryRequest, PushUnicastRequest,
};

use std::sync::Arc;

use crate::core::config::Config;
use crate::downlink::{DownlinkDispatcher, DownlinkFlow, ProprietaryDownlink};
use crate::error::{Error, Result};
use crate::lorawan::commands::{Cid, MacCommand};
use crate::lorawan::region::ChannelPlan;
use crate::lorawan::types::DevEui;
use crate::maccommand::{MacCommandBlock, MacCommandQueue};
use crate::session::{ActivationParams, DevAddrAllocator, DeviceLocks, SessionManager};
use crate::storage::{CommandQueueStore, DeviceProfileStore, DeviceStore, SessionStore};

/// Collaborators injected at construction. No component reaches for
/// ambient shared state.
pub struct ControlPlaneInputs {
    pub sessions: Arc<dyn SessionStore>,
    pub command_queue: Arc<dyn CommandQueueStore>,
    pub devices: Arc<dyn DeviceStore>,
    pub profiles: Arc<dyn DeviceProfileStore>,
    pub downlink_flow: Arc<dyn DownlinkFlow>,
}

/// The device session & downlink control plane.
pub struct ControlPlane {
    lifecycle: SessionManager,
    allocator: DevAddrAllocator,
    queue: MacCommandQueue,
    dispatcher: DownlinkDispatcher,
}

impl ControlPlane {
    pub fn new(config: &Config, inputs: ControlPlaneInputs) -> Self {
        let locks = Arc::new(DeviceLocks::new());
        let op_timeout = config.storage.op_timeout();

        let mut channel_plan = ChannelPlan::new(config.network.region);
        if let Some(sub_band) = config.network.sub_band {
            channel_plan.set_sub_band(sub_band);
        }

        let lifecycle = SessionManager::new(
            inputs.sessions.clone(),
            inputs.command_queue.clone(),
            inputs.devices,
            inputs.profiles,
            channel_plan,
            locks.clone(),
            op_timeout,
        );
        let allocator = DevAddrAllocator::new(
            inputs.sessions.clone(),
            config.devaddr.alloc_attempts,
            op_timeout,
        );
        let queue = MacCommandQueue::new(inputs.command_queue, locks.clone(), op_timeout);
        let dispatcher =
            DownlinkDispatcher::new(inputs.sessions, inputs.downlink_flow, locks, op_timeout);

        Self {
            lifecycle,
            allocator,
            queue,
            dispatcher,
        }
    }

    /// Activate a device, overwriting any prior session and flushing its
    /// MAC-command queue.
    pub async fn activate_device(&self, request: ActivateDeviceRequest) -> Result<()> {
        self.lifecycle
            .activate(ActivationParams {
                dev_eui: request.dev_eui,
                dev_addr: request.dev_addr,
                nwk_s_key: request.nwk_s_key,
                fcnt_up: request.fcnt_up,
                fcnt_down: request.fcnt_down,
                skip_fcnt_check: request.skip_fcnt_check,
            })
            .await
    }

    /// Delete a device's session. The second of two back-to-back calls
    /// surfaces the store's `NotFound`; callers may treat it as success.
    pub async fn deactivate_device(&self, request: DeactivateDeviceRequest) -> Result<()> {
        self.lifecycle.deactivate(request.dev_eui).await
    }

    /// Current activation state of a device.
    pub async fn get_activation(
        &self,
        request: GetActivationRequest,
    ) -> Result<GetActivationResponse> {
        let activation = self.lifecycle.get_activation(request.dev_eui).await?;
        Ok(GetActivationResponse {
            dev_addr: activation.dev_addr,
            nwk_s_key: activation.nwk_s_key,
            fcnt_up: activation.fcnt_up,
            fcnt_down: activation.fcnt_down,
            skip_fcnt_check: activation.skip_fcnt_check,
        })
    }

    /// Draw a random device address inside the given network's block.
    pub async fn allocate_dev_addr(
        &self,
        request: AllocateDevAddrRequest,
    ) -> Result<AllocateDevAddrResponse> {
        let dev_addr = self.allocator.allocate(request.net_id).await?;
        Ok(AllocateDevAddrResponse { dev_addr })
    }

    /// Queue one MAC-command block, replacing any pending block with the
    /// same CID. Raw command bytes are decoded first; nothing is stored on
    /// decode failure.
    pub async fn enqueue_mac_command(&self, request: EnqueueMacCommandRequest) -> Result<()> {
        let cid = Cid::from_u8(request.cid)
            .ok_or_else(|| Error::InvalidMacCommand(format!("unknown cid 0x{:02x}", request.cid)))?;

        let commands = request
            .commands
            .iter()
            .map(|raw| MacCommand::decode(raw))
            .collect::<Result<Vec<_>>>()?;

        self.queue
            .enqueue(
                request.dev_eui,
                MacCommandBlock {
                    cid,
                    frm_payload: request.frm_payload,
                    commands,
                    external: true,
                },
            )
            .await
    }

    /// Push an application payload to one device, gated on an exact
    /// downlink frame-counter match.
    pub async fn push_unicast(&self, request: PushUnicastRequest) -> Result<()> {
        self.dispatcher
            .push_unicast(
                request.dev_eui,
                request.fcnt_down,
                request.confirmed,
                request.port,
                &request.payload,
            )
            .await
    }

    /// Push a proprietary frame to an explicit gateway set.
    pub async fn push_proprietary(&self, request: PushProprietaryRequest) -> Result<()> {
        self.dispatcher
            .push_proprietary(ProprietaryDownlink {
                payload: request.payload,
                mic: request.mic,
                gateways: request.gateways,
                polarization_inversion: request.polarization_inversion,
                frequency: request.frequency,
                data_rate: request.data_rate,
            })
            .await
    }

    /// Pending MAC-command blocks for a device, in transmission order.
    /// Read path for the downlink-flow collaborator.
    pub async fn pending_mac_commands(&self, dev_eui: DevEui) -> Result<Vec<MacCommandBlock>> {
        self.queue.pending(dev_eui).await
    }
}
