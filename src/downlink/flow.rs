//! Contract of the downlink-flow collaborator.

use async_trait::async_trait;

use crate::error::Result;
use crate::lorawan::types::{GatewayEui, Mic};
use crate::storage::DeviceSession;

/// A session-independent downlink addressed straight to a gateway set by
/// radio parameters.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProprietaryDownlink {
    pub payload: Vec<u8>,
    /// Caller-computed message integrity code; this core never derives it.
    pub mic: Mic,
    pub gateways: Vec<GatewayEui>,
    /// Invert the downlink polarization (the usual setting for
    /// gateway-to-device transmissions).
    pub polarization_inversion: bool,
    /// Transmission frequency in Hz.
    pub frequency: u32,
    /// Regional data-rate index.
    pub data_rate: u8,
}

/// Consumer of this core's output. Owns frame assembly, MAC-command queue
/// draining, transmission scheduling, and the downlink counter increment
/// once a frame is committed to the radio path.
#[async_trait]
pub trait DownlinkFlow: Send + Sync {
    async fn push_unicast(
        &self,
        session: &DeviceSession,
        confirmed: bool,
        port: u8,
        payload: &[u8],
    ) -> Result<()>;

    async fn push_proprietary(&self, downlink: &ProprietaryDownlink) -> Result<()>;
}
