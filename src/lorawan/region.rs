//! Regional channel plans.
//!
//! A [`ChannelPlan`] is the server-side view of a region's uplink channel
//! table: which channel indices exist, their center frequencies, and which
//! are currently enabled. New sessions copy the enabled-index set at
//! activation time.

use std::fmt;
use std::str::FromStr;

use anyhow::bail;
use serde::Deserialize;

/// Maximum accepted gap between a received (truncated) uplink counter and
/// the expected one, per the regional band parameters.
pub const MAX_FCNT_GAP: u32 = 16_384;

/// Supported regional parameter sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Eu868,
    Us915,
}

impl FromStr for Region {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "eu868" => Ok(Self::Eu868),
            "us915" => Ok(Self::Us915),
            other => bail!("unsupported region {}", other),
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Region::Eu868 => f.write_str("eu868"),
            Region::Us915 => f.write_str("us915"),
        }
    }
}

/// Data-rate entry in a regional table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataRate {
    Sf12Bw125,
    Sf11Bw125,
    Sf10Bw125,
    Sf9Bw125,
    Sf8Bw125,
    Sf7Bw125,
    Sf7Bw250,
    Sf8Bw500,
}

impl DataRate {
    pub fn spreading_factor(&self) -> u8 {
        match self {
            DataRate::Sf12Bw125 => 12,
            DataRate::Sf11Bw125 => 11,
            DataRate::Sf10Bw125 => 10,
            DataRate::Sf9Bw125 => 9,
            DataRate::Sf8Bw125 | DataRate::Sf8Bw500 => 8,
            DataRate::Sf7Bw125 | DataRate::Sf7Bw250 => 7,
        }
    }

    /// Bandwidth in Hz.
    pub fn bandwidth(&self) -> u32 {
        match self {
            DataRate::Sf7Bw250 => 250_000,
            DataRate::Sf8Bw500 => 500_000,
            _ => 125_000,
        }
    }
}

/// One uplink channel in the plan.
#[derive(Debug, Clone)]
pub struct Channel {
    /// Center frequency in Hz.
    pub frequency: u32,
    pub min_dr: DataRate,
    pub max_dr: DataRate,
    pub enabled: bool,
}

/// Uplink channel table for one region.
#[derive(Debug, Clone)]
pub struct ChannelPlan {
    region: Region,
    channels: Vec<Channel>,
}

impl ChannelPlan {
    pub fn new(region: Region) -> Self {
        let channels = match region {
            Region::Eu868 => eu868_channels(),
            Region::Us915 => us915_channels(),
        };
        Self { region, channels }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Restrict a US915 plan to one 8-channel sub-band (0-7). The paired
    /// 500 kHz channel stays enabled. No effect on other regions.
    pub fn set_sub_band(&mut self, sub_band: u8) {
        if self.region != Region::Us915 {
            return;
        }
        let sub_band = usize::from(sub_band.min(7));
        for (i, channel) in self.channels.iter_mut().enumerate() {
            channel.enabled = if i < 64 {
                i / 8 == sub_band
            } else {
                i - 64 == sub_band
            };
        }
    }

    /// Indices of the currently enabled uplink channels; seeds the
    /// enabled-channel set of every new session.
    pub fn enabled_uplink_channels(&self) -> Vec<usize> {
        self.channels
            .iter()
            .enumerate()
            .filter(|(_, c)| c.enabled)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn channel(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

fn eu868_channels() -> Vec<Channel> {
    [868_100_000u32, 868_300_000, 868_500_000]
        .into_iter()
        .map(|frequency| Channel {
            frequency,
            min_dr: DataRate::Sf12Bw125,
            max_dr: DataRate::Sf7Bw125,
            enabled: true,
        })
        .collect()
}

fn us915_channels() -> Vec<Channel> {
    let mut channels = Vec::with_capacity(72);

    // 64 x 125 kHz upstream channels, 902.3 MHz + n * 200 kHz
    for i in 0..64u32 {
        channels.push(Channel {
            frequency: 902_300_000 + i * 200_000,
            min_dr: DataRate::Sf10Bw125,
            max_dr: DataRate::Sf7Bw125,
            enabled: true,
        });
    }

    // 8 x 500 kHz upstream channels, 903.0 MHz + n * 1.6 MHz
    for i in 0..8u32 {
        channels.push(Channel {
            frequency: 903_000_000 + i * 1_600_000,
            min_dr: DataRate::Sf8Bw500,
            max_dr: DataRate::Sf8Bw500,
            enabled: true,
        });
    }

    channels
}

/// Device profiles carry factory-preset frequencies in MHz; sessions store
/// Hz.
pub fn mhz_to_hz(mhz: f64) -> u32 {
    (mhz * 1_000_000.0).round() as u32
}
