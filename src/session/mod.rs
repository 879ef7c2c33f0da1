//! Session lifecycle management, device-address allocation and per-device
//! serialization.

pub mod devaddr;
pub mod lifecycle;
pub mod locks;

pub use devaddr::DevAddrAllocator;
pub use lifecycle::{Activation, ActivationParams, SessionManager};
pub use locks::DeviceLocks;
