//! Downlink MAC-command identifiers and decoding.
//!
//! This is the codec boundary of the core: caller-supplied raw command
//! bytes are decoded here before anything is queued. Frame-level binary
//! formats stay out of scope; only the network-initiated (downlink)
//! command set is understood.

use crate::error::{Error, Result};

/// MAC command identifier. One CID covers both directions of a command
/// exchange; the queue uses it as the replacement key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u8)]
pub enum Cid {
    LinkCheck = 0x02,
    LinkAdr = 0x03,
    DutyCycle = 0x04,
    RxParamSetup = 0x05,
    DevStatus = 0x06,
    NewChannel = 0x07,
    RxTimingSetup = 0x08,
    TxParamSetup = 0x09,
    DlChannel = 0x0a,
}

impl Cid {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x02 => Some(Self::LinkCheck),
            0x03 => Some(Self::LinkAdr),
            0x04 => Some(Self::DutyCycle),
            0x05 => Some(Self::RxParamSetup),
            0x06 => Some(Self::DevStatus),
            0x07 => Some(Self::NewChannel),
            0x08 => Some(Self::RxTimingSetup),
            0x09 => Some(Self::TxParamSetup),
            0x0a => Some(Self::DlChannel),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A decoded network-initiated MAC command.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum MacCommand {
    /// Answer to a device link-check request.
    LinkCheckAns {
        /// Demodulation margin of the best uplink, in dB.
        margin: u8,
        /// Number of gateways that received the request.
        gateway_count: u8,
    },
    /// Data-rate / power / channel-mask adjustment.
    LinkAdrReq {
        data_rate: u8,
        tx_power: u8,
        ch_mask: u16,
        ch_mask_cntl: u8,
        nb_trans: u8,
    },
    DutyCycleReq {
        max_duty_cycle: u8,
    },
    RxParamSetupReq {
        rx1_dr_offset: u8,
        rx2_data_rate: u8,
        /// RX2 frequency in Hz.
        frequency: u32,
    },
    DevStatusReq,
    NewChannelReq {
        ch_index: u8,
        /// Channel frequency in Hz.
        frequency: u32,
        max_dr: u8,
        min_dr: u8,
    },
    RxTimingSetupReq {
        /// RX1 delay in seconds (0 meaning 1).
        delay: u8,
    },
    TxParamSetupReq {
        downlink_dwell_time: bool,
        uplink_dwell_time: bool,
        max_eirp: u8,
    },
    DlChannelReq {
        ch_index: u8,
        /// Downlink frequency in Hz.
        frequency: u32,
    },
}

/// Frequency fields travel as 24-bit little-endian multiples of 100 Hz.
fn frequency_from(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]) * 100
}

impl MacCommand {
    /// Decode one raw command: a CID byte followed by its payload.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let (&cid_byte, payload) = raw
            .split_first()
            .ok_or_else(|| Error::InvalidMacCommand("empty command".into()))?;

        let cid = Cid::from_u8(cid_byte)
            .ok_or_else(|| Error::InvalidMacCommand(format!("unknown cid 0x{cid_byte:02x}")))?;

        let expected = Self::payload_len(cid);
        if payload.len() != expected {
            return Err(Error::InvalidMacCommand(format!(
                "cid 0x{cid_byte:02x}: expected {expected} payload bytes, got {}",
                payload.len()
            )));
        }

        let command = match cid {
            Cid::LinkCheck => MacCommand::LinkCheckAns {
                margin: payload[0],
                gateway_count: payload[1],
            },
            Cid::LinkAdr => MacCommand::LinkAdrReq {
                data_rate: payload[0] >> 4,
                tx_power: payload[0] & 0x0f,
                ch_mask: u16::from_le_bytes([payload[1], payload[2]]),
                ch_mask_cntl: (payload[3] >> 4) & 0x07,
                nb_trans: payload[3] & 0x0f,
            },
            Cid::DutyCycle => MacCommand::DutyCycleReq {
                max_duty_cycle: payload[0] & 0x0f,
            },
            Cid::RxParamSetup => MacCommand::RxParamSetupReq {
                rx1_dr_offset: (payload[0] >> 4) & 0x07,
                rx2_data_rate: payload[0] & 0x0f,
                frequency: frequency_from(&payload[1..4]),
            },
            Cid::DevStatus => MacCommand::DevStatusReq,
            Cid::NewChannel => MacCommand::NewChannelReq {
                ch_index: payload[0],
                frequency: frequency_from(&payload[1..4]),
                max_dr: payload[4] >> 4,
                min_dr: payload[4] & 0x0f,
            },
            Cid::RxTimingSetup => MacCommand::RxTimingSetupReq {
                delay: payload[0] & 0x0f,
            },
            Cid::TxParamSetup => MacCommand::TxParamSetupReq {
                downlink_dwell_time: (payload[0] & 0x20) != 0,
                uplink_dwell_time: (payload[0] & 0x10) != 0,
                max_eirp: payload[0] & 0x0f,
            },
            Cid::DlChannel => MacCommand::DlChannelReq {
                ch_index: payload[0],
                frequency: frequency_from(&payload[1..4]),
            },
        };

        Ok(command)
    }

    /// Payload length (excluding the CID byte) of the downlink form.
    fn payload_len(cid: Cid) -> usize {
        match cid {
            Cid::LinkCheck => 2,
            Cid::LinkAdr => 4,
            Cid::DutyCycle => 1,
            Cid::RxParamSetup => 4,
            Cid::DevStatus => 0,
            Cid::NewChannel => 5,
            Cid::RxTimingSetup => 1,
            Cid::TxParamSetup => 1,
            Cid::DlChannel => 4,
        }
    }

    pub fn cid(&self) -> Cid {
        match self {
            MacCommand::LinkCheckAns { .. } => Cid::LinkCheck,
            MacCommand::LinkAdrReq { .. } => Cid::LinkAdr,
            MacCommand::DutyCycleReq { .. } => Cid::DutyCycle,
            MacCommand::RxParamSetupReq { .. } => Cid::RxParamSetup,
            MacCommand::DevStatusReq => Cid::DevStatus,
            MacCommand::NewChannelReq { .. } => Cid::NewChannel,
            MacCommand::RxTimingSetupReq { .. } => Cid::RxTimingSetup,
            MacCommand::TxParamSetupReq { .. } => Cid::TxParamSetup,
            MacCommand::DlChannelReq { .. } => Cid::DlChannel,
        }
    }
}
