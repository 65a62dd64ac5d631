mod legacy;
mod minecraft;

use std::fmt;

use serde::Deserialize;

pub use legacy::{Legacy14, Legacy16};
pub use minecraft::{Minecraft, build_latest_request, write_varint};

/// The protocol version we claim in the 1.7+ handshake. Servers answer the
/// status request regardless of what we send here.
pub const DEFAULT_PROTOCOL_VERSION: i32 = 47;

/// Writes a dialect's status request. Implementations only produce bytes, the
/// connection they end up on is owned by whoever calls them.
pub trait QueryEncoder: Send + Sync {
    fn payload(&self, hostname: &str, port: u16) -> Vec<u8>;
}

/// One of the status query dialects we know how to speak.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize, enum_utils::FromStr)]
pub enum Dialect {
    /// Netty handshake + status request, 1.7 and newer.
    #[serde(rename = "1_7")]
    #[enumeration(rename = "1_7")]
    V1_7,
    /// `FE 01 FA` with an `MC|PingHost` plugin message.
    #[serde(rename = "1_6")]
    #[enumeration(rename = "1_6")]
    V1_6,
    /// `FE 01`, also answered by beta 1.8 through 1.3 servers.
    #[serde(rename = "1_4")]
    #[enumeration(rename = "1_4")]
    V1_4,
}

/// Every dialect, newest first. Probing pops from the end, so the oldest
/// dialect is tried first.
pub const CANDIDATES: [Dialect; 3] = [Dialect::V1_7, Dialect::V1_6, Dialect::V1_4];

impl Dialect {
    pub fn encoder(self) -> &'static dyn QueryEncoder {
        static MINECRAFT: Minecraft = Minecraft::new(DEFAULT_PROTOCOL_VERSION);
        match self {
            Dialect::V1_7 => &MINECRAFT,
            Dialect::V1_6 => &Legacy16,
            Dialect::V1_4 => &Legacy14,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::V1_7 => "1_7",
            Dialect::V1_6 => "1_6",
            Dialect::V1_4 => "1_4",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_dialect_from_str() {
        assert_eq!(Dialect::from_str("1_7"), Ok(Dialect::V1_7));
        assert_eq!(Dialect::from_str("1_6"), Ok(Dialect::V1_6));
        assert_eq!(Dialect::from_str("1_4"), Ok(Dialect::V1_4));
        assert!(Dialect::from_str("1_5").is_err());
    }

    #[test]
    fn test_every_dialect_has_a_payload() {
        for dialect in CANDIDATES {
            assert!(!dialect.encoder().payload("localhost", 25565).is_empty());
        }
    }
}
