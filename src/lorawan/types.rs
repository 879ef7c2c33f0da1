//! LoRaWAN identifier and key newtypes.
//!
//! All identifiers serialize as lowercase hex strings, the representation
//! used on the API surface and in logs.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

fn parse_hex<const N: usize>(s: &str) -> Result<[u8; N], String> {
    let bytes = hex::decode(s).map_err(|e| format!("invalid hex: {e}"))?;
    let mut out = [0u8; N];
    if bytes.len() != N {
        return Err(format!("expected {} hex bytes, got {}", N, bytes.len()));
    }
    out.copy_from_slice(&bytes);
    Ok(out)
}

macro_rules! hex_string_serde {
    ($ty:ident) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(de::Error::custom)
            }
        }
    };
}

/// EUI-64 device identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct DevEui([u8; 8]);

impl DevEui {
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for DevEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevEui({self})")
    }
}

impl FromStr for DevEui {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map(Self)
    }
}

hex_string_serde!(DevEui);

/// EUI-64 gateway identifier (the gateway's MAC).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GatewayEui([u8; 8]);

impl GatewayEui {
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }
}

impl fmt::Display for GatewayEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for GatewayEui {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GatewayEui({self})")
    }
}

impl FromStr for GatewayEui {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map(Self)
    }
}

hex_string_serde!(GatewayEui);

/// 32-bit device address: 7-bit NwkID in bits 31..25, 25-bit NwkAddr below.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DevAddr(u32);

/// Bit mask of the NwkAddr portion of a device address.
pub const NWK_ADDR_MASK: u32 = 0x01ff_ffff;

impl DevAddr {
    pub fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Place a raw draw inside the address block assigned to `net_id`:
    /// the 7 high-order bits carry the NwkID, the rest is the draw.
    pub fn compose(net_id: NetId, raw: u32) -> Self {
        Self((raw & NWK_ADDR_MASK) | (u32::from(net_id.nwk_id()) << 25))
    }

    pub fn nwk_id(&self) -> u8 {
        (self.0 >> 25) as u8
    }

    pub fn nwk_addr(&self) -> u32 {
        self.0 & NWK_ADDR_MASK
    }

    pub fn to_be_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for DevAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}

impl fmt::Debug for DevAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DevAddr({self})")
    }
}

impl FromStr for DevAddr {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex::<4>(s).map(|b| Self(u32::from_be_bytes(b)))
    }
}

hex_string_serde!(DevAddr);

/// 24-bit network identifier. The low 7 bits (NwkID) prefix every device
/// address administered by the network.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NetId(u32);

impl NetId {
    /// Build from a raw 24-bit value; higher bits are discarded.
    pub fn new(raw: u32) -> Self {
        Self(raw & 0x00ff_ffff)
    }

    pub fn nwk_id(&self) -> u8 {
        (self.0 & 0x7f) as u8
    }
}

impl fmt::Display for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:06x}", self.0)
    }
}

impl fmt::Debug for NetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetId({self})")
    }
}

impl FromStr for NetId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex::<3>(s).map(|b| Self(u32::from_be_bytes([0, b[0], b[1], b[2]])))
    }
}

hex_string_serde!(NetId);

/// AES-128 network session key. Opaque to this core; the Debug form is
/// redacted so session records can be logged without leaking key material.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct AesKey([u8; 16]);

impl AesKey {
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for AesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AesKey(redacted)")
    }
}

impl FromStr for AesKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map(Self)
    }
}

hex_string_serde!(AesKey);

/// 4-byte message integrity code, supplied by the caller on the
/// proprietary downlink path.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct Mic([u8; 4]);

impl Mic {
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Mic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for Mic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Mic({self})")
    }
}

impl FromStr for Mic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_hex(s).map(Self)
    }
}

hex_string_serde!(Mic);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_eui_hex_round_trip() {
        let eui: DevEui = "0102030405060708".parse().unwrap();
        assert_eq!(eui.as_bytes(), &[1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(eui.to_string(), "0102030405060708");
    }

    #[test]
    fn test_dev_eui_rejects_bad_input() {
        assert!("01020304".parse::<DevEui>().is_err());
        assert!("01020304050607zz".parse::<DevEui>().is_err());
    }

    #[test]
    fn test_dev_addr_compose_sets_nwk_id() {
        let net_id: NetId = "000013".parse().unwrap();
        assert_eq!(net_id.nwk_id(), 0x13);

        let addr = DevAddr::compose(net_id, 0xffff_ffff);
        assert_eq!(addr.nwk_id(), 0x13);
        assert_eq!(addr.nwk_addr(), NWK_ADDR_MASK);

        let addr = DevAddr::compose(net_id, 0);
        assert_eq!(addr.nwk_id(), 0x13);
        assert_eq!(addr.nwk_addr(), 0);
    }

    #[test]
    fn test_dev_addr_display_parse() {
        let addr: DevAddr = "26012f01".parse().unwrap();
        assert_eq!(addr.to_string(), "26012f01");
        assert_eq!(addr.to_be_bytes(), [0x26, 0x01, 0x2f, 0x01]);
    }

    #[test]
    fn test_aes_key_debug_is_redacted() {
        let key: AesKey = "000102030405060708090a0b0c0d0e0f".parse().unwrap();
        assert_eq!(format!("{key:?}"), "AesKey(redacted)");
        assert_eq!(key.to_string(), "000102030405060708090a0b0c0d0e0f");
    }

    #[test]
    fn test_serde_uses_hex_strings() {
        let addr: DevAddr = "01fffffe".parse().unwrap();
        let json = serde_json::to_string(&addr).unwrap();
        assert_eq!(json, "\"01fffffe\"");
        let back: DevAddr = serde_json::from_str(&json).unwrap();
        assert_eq!(back, addr);
    }
}
