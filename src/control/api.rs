//! Request/response types for the surface this core exposes to its
//! caller, independent of wire encoding.

use serde::{Deserialize, Serialize};

use crate::lorawan::types::{AesKey, DevAddr, DevEui, GatewayEui, Mic, NetId};

/// Request to activate a device (ABP).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivateDeviceRequest {
    pub dev_eui: DevEui,
    pub dev_addr: DevAddr,
    pub nwk_s_key: AesKey,
    #[serde(default)]
    pub fcnt_up: u32,
    #[serde(default)]
    pub fcnt_down: u32,
    #[serde(default)]
    pub skip_fcnt_check: bool,
}

/// Request to deactivate a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeactivateDeviceRequest {
    pub dev_eui: DevEui,
}

/// Request for a device's current activation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetActivationRequest {
    pub dev_eui: DevEui,
}

/// Current activation state of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GetActivationResponse {
    pub dev_addr: DevAddr,
    pub nwk_s_key: AesKey,
    pub fcnt_up: u32,
    pub fcnt_down: u32,
    pub skip_fcnt_check: bool,
}

/// Request for a random device address inside a network's block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocateDevAddrRequest {
    pub net_id: NetId,
}

/// Allocated device address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocateDevAddrResponse {
    pub dev_addr: DevAddr,
}

/// Request to queue one MAC-command block for a device.
///
/// `commands` holds raw encodings (CID byte plus payload, one entry per
/// command); they are decoded and validated before anything is stored.
/// `frm_payload` carries the block opaquely when the commands travel
/// encrypted in FRMPayload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnqueueMacCommandRequest {
    pub dev_eui: DevEui,
    pub cid: u8,
    #[serde(default)]
    pub frm_payload: Vec<u8>,
    #[serde(default)]
    pub commands: Vec<Vec<u8>>,
}

/// Request to push an application payload to one device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushUnicastRequest {
    pub dev_eui: DevEui,
    /// Must equal the session's stored downlink counter exactly.
    pub fcnt_down: u32,
    #[serde(default)]
    pub confirmed: bool,
    pub port: u8,
    pub payload: Vec<u8>,
}

/// Request to push a proprietary frame to an explicit gateway set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushProprietaryRequest {
    pub payload: Vec<u8>,
    pub mic: Mic,
    pub gateways: Vec<GatewayEui>,
    #[serde(default)]
    pub polarization_inversion: bool,
    /// Transmission frequency in Hz.
    pub frequency: u32,
    /// Regional data-rate index.
    pub data_rate: u8,
}
