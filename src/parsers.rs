mod legacy;
mod minecraft;

use tracing::trace;

pub use legacy::{BetaDecoder, Legacy14Decoder, Legacy16Decoder};
pub use minecraft::{MinecraftDecoder, parse_ping_response_json, read_varint};

use crate::status::StatusRecord;

#[derive(Debug, PartialEq, Eq)]
pub enum ParseResponseError {
    Invalid,
    Incomplete { expected_length: u32 },
}

/// Turns the raw bytes of a status response into a [`StatusRecord`]. Must
/// return an error rather than panic on bytes it doesn't recognize.
pub trait ResponseDecoder: Send + Sync {
    fn name(&self) -> &'static str;
    fn decode(&self, data: &[u8]) -> Result<StatusRecord, ParseResponseError>;
}

/// Tries each registered decoder in order and keeps the first one that
/// accepts the response.
///
/// The order doesn't depend on which query was sent since servers don't
/// always answer in the dialect they were asked in (for example a 1.8 server
/// answers `FE 01` with a legacy kick packet).
pub struct ParserSelector {
    decoders: Vec<Box<dyn ResponseDecoder>>,
}

impl Default for ParserSelector {
    fn default() -> Self {
        // newest wire shape first
        Self::new(vec![
            Box::new(MinecraftDecoder),
            Box::new(Legacy16Decoder),
            Box::new(Legacy14Decoder),
            Box::new(BetaDecoder),
        ])
    }
}

impl ParserSelector {
    pub fn new(decoders: Vec<Box<dyn ResponseDecoder>>) -> Self {
        Self { decoders }
    }

    /// Returns `None` if no decoder understood the response.
    pub fn parse(&self, data: &[u8]) -> Option<StatusRecord> {
        self.decoders.iter().find_map(|decoder| match decoder.decode(data) {
            Ok(status) => {
                trace!("{} decoder accepted {} bytes", decoder.name(), data.len());
                Some(status)
            }
            Err(err) => {
                trace!("{} decoder rejected response: {err:?}", decoder.name());
                None
            }
        })
    }
}

#[cfg(test)]
pub(crate) fn test_kick_packet(reason: &str) -> Vec<u8> {
    legacy::test::kick_packet(reason)
}

#[cfg(test)]
pub(crate) fn test_status_response(json: &str) -> Vec<u8> {
    minecraft::test::status_response(json)
}
