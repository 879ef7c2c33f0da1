#![deny(clippy::all)]
// Module naming: common pattern in domain-driven code
#![allow(clippy::module_name_repetitions)]
// Documentation style: many protocol terms don't need backticks
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
// API ergonomics: prefer simplicity over must_use annotations
#![allow(clippy::must_use_candidate)]
// Format strings: allow non-inlined for readability
#![allow(clippy::uninlined_format_args)]

//! Loraplane - LoRaWAN network-server device session & downlink control
//! plane.
//!
//! The crate owns per-device radio session state, enforces frame-counter
//! security invariants, queues network-initiated MAC commands, and routes
//! downlink payloads to a device or gateway set. It sits between an
//! upstream application layer and the session persistence layer; frame
//! binary formats, gateway inventory and downlink window scheduling stay
//! with external collaborators.
//!
//! # Module Organization
//!
//! ## Core
//! - `core::config` - Configuration parsing and validation
//!
//! ## Domain
//! - `lorawan::types` - Identifier and key newtypes
//! - `lorawan::commands` - Downlink MAC-command codec
//! - `lorawan::region` - Regional channel plans
//!
//! ## Storage
//! - `storage::session` - Session records and the session store contract
//! - `storage::queue` - MAC-command queue persistence
//! - `storage::profile` - Device and device-profile lookups
//!
//! ## Components
//! - `session` - Lifecycle, device-address allocation, per-device locks
//! - `maccommand` - Pending command blocks with replacement-by-CID
//! - `downlink` - Frame-counter gated dispatch and the flow contract
//!
//! ## Surface
//! - `control` - Request/response types and the `ControlPlane` facade

// Core infrastructure
pub mod core;

// Domain vocabulary
pub mod lorawan;

// Storage contracts
pub mod storage;

// Components
pub mod downlink;
pub mod maccommand;
pub mod session;

// Surface
pub mod control;

pub mod error;

// Re-exports for convenience
pub use self::core::{config, Config};
pub use control::{ControlPlane, ControlPlaneInputs};
pub use downlink::{DownlinkDispatcher, DownlinkFlow, ProprietaryDownlink};
pub use error::{Error, ErrorKind, Result};
pub use lorawan::{
    AesKey, ChannelPlan, Cid, DevAddr, DevEui, GatewayEui, MacCommand, Mic, NetId, Region,
};
pub use maccommand::{MacCommandBlock, MacCommandQueue};
pub use session::{Activation, ActivationParams, DevAddrAllocator, SessionManager};
pub use storage::{DeviceSession, MemoryCommandQueueStore, MemorySessionStore, SessionStore};
