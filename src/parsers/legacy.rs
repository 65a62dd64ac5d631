use std::sync::LazyLock;

use regex::Regex;

use super::{ParseResponseError, ResponseDecoder};
use crate::status::{ResponseShape, StatusRecord};

/// 1.6.1 was protocol 73, anything older answering with `§1` is 1.4 or 1.5.
const FIRST_1_6_PROTOCOL_VERSION: i32 = 73;

static FORMATTING_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("§.").expect("formatting code regex is valid"));

/// `§1` kick packet from a 1.6 server.
pub struct Legacy16Decoder;

impl ResponseDecoder for Legacy16Decoder {
    fn name(&self) -> &'static str {
        "1_6"
    }

    fn decode(&self, data: &[u8]) -> Result<StatusRecord, ParseResponseError> {
        let status = parse_v1_response(data, ResponseShape::Legacy16)?;
        if status.version_protocol < Some(FIRST_1_6_PROTOCOL_VERSION) {
            return Err(ParseResponseError::Invalid);
        }
        Ok(status)
    }
}

/// `§1` kick packet from a 1.4 or 1.5 server.
pub struct Legacy14Decoder;

impl ResponseDecoder for Legacy14Decoder {
    fn name(&self) -> &'static str {
        "1_4"
    }

    fn decode(&self, data: &[u8]) -> Result<StatusRecord, ParseResponseError> {
        parse_v1_response(data, ResponseShape::Legacy14)
    }
}

/// `motd§online§max` kick packet from beta 1.8 up to 1.3.
pub struct BetaDecoder;

impl ResponseDecoder for BetaDecoder {
    fn name(&self) -> &'static str {
        "pre_1_4"
    }

    fn decode(&self, data: &[u8]) -> Result<StatusRecord, ParseResponseError> {
        let kick = read_kick_string(data)?;
        if kick.starts_with("§1\0") {
            return Err(ParseResponseError::Invalid);
        }

        // the motd can contain § itself, so split from the right
        let mut parts = kick.rsplitn(3, '§');
        let (Some(max), Some(online), Some(motd)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(ParseResponseError::Invalid);
        };

        Ok(StatusRecord::legacy(
            ResponseShape::Beta,
            strip_formatting(motd),
            None,
            None,
            parse_count(online)?,
            parse_count(max)?,
        ))
    }
}

/// Parse a `§1\0protocol\0version\0motd\0online\0max` kick packet.
fn parse_v1_response(
    data: &[u8],
    shape: ResponseShape,
) -> Result<StatusRecord, ParseResponseError> {
    let kick = read_kick_string(data)?;
    let Some(fields) = kick.strip_prefix("§1\0") else {
        return Err(ParseResponseError::Invalid);
    };

    let fields = fields.split('\0').collect::<Vec<_>>();
    let [protocol, version, motd, online, max] = fields.as_slice() else {
        return Err(ParseResponseError::Invalid);
    };

    Ok(StatusRecord::legacy(
        shape,
        strip_formatting(motd),
        Some(version.to_string()),
        Some(parse_count(protocol)?),
        parse_count(online)?,
        parse_count(max)?,
    ))
}

/// Read the reason string out of a `0xff` kick packet.
fn read_kick_string(data: &[u8]) -> Result<String, ParseResponseError> {
    let [0xff, len_hi, len_lo, rest @ ..] = data else {
        return Err(ParseResponseError::Invalid);
    };
    // the length is in UTF-16 code units
    let len = u16::from_be_bytes([*len_hi, *len_lo]) as usize;
    if rest.len() < len * 2 {
        return Err(ParseResponseError::Incomplete {
            expected_length: (len * 2) as u32,
        });
    }

    let units = rest[..len * 2]
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect::<Vec<_>>();
    String::from_utf16(&units).map_err(|_| ParseResponseError::Invalid)
}

fn parse_count(s: &str) -> Result<i32, ParseResponseError> {
    s.trim().parse().map_err(|_| ParseResponseError::Invalid)
}

fn strip_formatting(s: &str) -> String {
    FORMATTING_CODE.replace_all(s, "").into_owned()
}
