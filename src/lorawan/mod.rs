//! LoRaWAN domain vocabulary: identifiers, the downlink MAC-command
//! codec, and regional channel plans.

pub mod commands;
pub mod region;
pub mod types;

pub use commands::{Cid, MacCommand};
pub use region::{ChannelPlan, DataRate, Region};
pub use types::{AesKey, DevAddr, DevEui, GatewayEui, Mic, NetId};
