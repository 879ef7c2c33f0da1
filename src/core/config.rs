//! Configuration parsing and validation.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::lorawan::region::Region;
use crate::lorawan::types::NetId;

fn default_op_timeout_ms() -> u64 {
    1_000
}

fn default_alloc_attempts() -> usize {
    10
}

/// Top-level configuration for the control plane.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub network: NetworkConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub devaddr: DevAddrConfig,
}

/// Network identity and regional parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// 24-bit network identifier, hex encoded (e.g. "000013").
    pub net_id: NetId,
    pub region: Region,
    /// US915 sub-band restriction (0-7). Leave unset elsewhere.
    #[serde(default)]
    pub sub_band: Option<u8>,
}

/// Bounds on calls into the storage collaborators.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Per-operation deadline in milliseconds; elapsing surfaces as
    /// `Unavailable`.
    #[serde(default = "default_op_timeout_ms")]
    pub op_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            op_timeout_ms: default_op_timeout_ms(),
        }
    }
}

impl StorageConfig {
    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

/// Device-address allocation bounds.
#[derive(Debug, Clone, Deserialize)]
pub struct DevAddrConfig {
    /// Redraw budget before allocation fails with `Exhausted`.
    #[serde(default = "default_alloc_attempts")]
    pub alloc_attempts: usize,
}

impl Default for DevAddrConfig {
    fn default() -> Self {
        Self {
            alloc_attempts: default_alloc_attempts(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_toml_str(&data)
    }

    pub fn from_toml_str(data: &str) -> Result<Self> {
        let config: Config = toml::from_str(data).context("parse config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage.op_timeout_ms == 0 {
            bail!("storage.op_timeout_ms must be at least 1");
        }
        if self.devaddr.alloc_attempts == 0 {
            bail!("devaddr.alloc_attempts must be at least 1");
        }
        match (self.network.region, self.network.sub_band) {
            (Region::Us915, Some(sub_band)) if sub_band > 7 => {
                bail!("network.sub_band must be 0-7, got {}", sub_band);
            }
            (region, Some(_)) if region != Region::Us915 => {
                bail!("network.sub_band only applies to us915");
            }
            _ => Ok(()),
        }
    }
}
