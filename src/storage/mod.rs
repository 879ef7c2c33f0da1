//! Storage contracts and their in-process implementations.
//!
//! Every trait here is a collaborator boundary: the real deployment backs
//! them with the durable store of its choice, while the `Memory*` types
//! provide the reference key-level semantics and the test backend.

pub mod profile;
pub mod queue;
pub mod session;

pub use profile::{
    Device, DeviceProfile, DeviceProfileStore, DeviceStore, MemoryDeviceProfileStore,
    MemoryDeviceStore,
};
pub use queue::{CommandQueueStore, MemoryCommandQueueStore};
pub use session::{DeviceSession, MemorySessionStore, SessionStore};

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Bound a storage call by the configured per-operation deadline.
///
/// Elapsing the deadline surfaces as `Unavailable`, never as success; the
/// in-flight call is dropped, which is the only cancellation this core
/// propagates.
pub async fn bounded<T, F>(what: &'static str, limit: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(Error::Unavailable(format!("{what}: deadline exceeded"))),
    }
}
