use std::{
    collections::HashSet,
    io::{Cursor, Read},
};

use eyre::bail;
use serde::Deserialize;
use sha2::Digest;
use simd_json::derived::{ValueObjectAccess, ValueObjectAccessAsArray, ValueObjectAccessAsScalar};
use tracing::trace;
use uuid::Uuid;

use super::{ParseResponseError, ResponseDecoder};
use crate::status::{ResponseShape, SamplePlayer, StatusRecord};

pub const ANONYMOUS_PLAYER_NAME: &str = "Anonymous Player";

/// Decodes the 1.7+ status response packet.
pub struct MinecraftDecoder;

impl ResponseDecoder for MinecraftDecoder {
    fn name(&self) -> &'static str {
        "1_7"
    }

    fn decode(&self, data: &[u8]) -> Result<StatusRecord, ParseResponseError> {
        let status_json = parse_response(data)?;
        parse_ping_response_json(status_json).map_err(|err| {
            trace!("bad status json: {err}");
            ParseResponseError::Invalid
        })
    }
}

/// Strip the packet framing and return the JSON string.
fn parse_response(response: &[u8]) -> Result<&[u8], ParseResponseError> {
    // ignore the packet length
    let mut stream = Cursor::new(response);
    read_varint(&mut stream).ok_or(ParseResponseError::Invalid)?;
    let packet_id = read_varint(&mut stream).ok_or(ParseResponseError::Invalid)?;
    let response_length = read_varint(&mut stream).ok_or(ParseResponseError::Invalid)?;
    if packet_id != 0x00 || response_length < 0 {
        return Err(ParseResponseError::Invalid);
    }
    // read until end
    let position = stream.position() as usize;
    let status_buffer = &response[position..];
    if status_buffer.len() < response_length as usize {
        return Err(ParseResponseError::Incomplete {
            expected_length: response_length as u32,
        });
    }
    let status_buffer = &status_buffer[..response_length as usize];

    // make sure it starts with {
    if status_buffer.first() != Some(&b'{') {
        return Err(ParseResponseError::Invalid);
    }

    Ok(status_buffer)
}

pub fn read_varint(reader: &mut impl Read) -> Option<i32> {
    let mut buffer = [0];
    let mut ans = 0;
    for i in 0..5 {
        reader.read_exact(&mut buffer).ok()?;
        ans |= ((buffer[0] & 0b0111_1111) as i32) << (7 * i);
        if buffer[0] & 0b1000_0000 == 0 {
            return Some(ans);
        }
    }
    // more than 5 bytes isn't a valid i32
    None
}

pub fn parse_ping_response_json(d: &[u8]) -> eyre::Result<StatusRecord> {
    let mut d = String::from_utf8_lossy(d).into_owned().into_bytes();

    let v = match simd_json::to_owned_value(&mut d) {
        Ok(v) => v,
        Err(_) => {
            bail!("Failed to parse JSON: {:?}", String::from_utf8_lossy(&d));
        }
    };

    let description = v.get("description");
    let description_json = description.map(simd_json::to_string).transpose()?;
    let description_plaintext = description
        .map(|description| {
            azalea_chat::FormattedText::deserialize(description)
                .unwrap_or_default()
                .to_string()
        })
        .unwrap_or_default();

    let version = v.get("version");
    let version_name = version.get_str("name").map(str::to_owned);
    let version_protocol = version.get_i32("protocol");

    // filter out bad favicons
    let favicon = v
        .get_str("favicon")
        .filter(|f| f.starts_with("data:image/png;base64,"))
        .map(str::to_owned);
    let favicon_hash = favicon.as_ref().map(|s| make_favicon_hash(s));

    let players = v.get("players");

    if description.is_none() && version.is_none() && players.is_none() {
        // some servers are missing one of these fields (even description isn't
        // technically required), but if they're missing all three then it's
        // probably not even a minecraft server
        bail!("Missing description, version, and players fields");
    }

    let online_players = players.get_i32("online");
    let max_players = players.get_i32("max");
    let mut is_online_mode = None;
    let mut seen_uuids = HashSet::new();

    // servers with this motd randomize the online players
    let mut is_fake_sample = description_plaintext
        == "To protect the privacy of this server and its\nusers, you must log in once to see ping data.";

    let player_sample = players
        .get_array("sample")
        .map(|a| {
            a.iter()
                .filter_map(|v| {
                    let Some(name) = v.get_str("name").map(str::to_owned) else {
                        // name is required
                        is_fake_sample = true;
                        return None;
                    };
                    let Some(uuid) = v.get_str("id").and_then(|s| Uuid::parse_str(s).ok()) else {
                        // uuid is required
                        is_fake_sample = true;
                        return None;
                    };
                    if !seen_uuids.insert(uuid) {
                        // no duplicate uuids allowed
                        is_fake_sample = true;
                        return None;
                    }

                    match uuid.get_version_num() {
                        4 => is_online_mode = Some(true),
                        3 => {
                            if is_online_mode.is_none() {
                                is_online_mode = Some(false);
                            }
                        }
                        _ if uuid.is_nil() && name == ANONYMOUS_PLAYER_NAME => {
                            // anonymous player doesn't give us any info
                        }
                        _ => is_fake_sample = true,
                    }

                    Some(SamplePlayer { name, uuid })
                })
                .collect()
        })
        .unwrap_or_default();

    let previews_chat = v.get_bool("previewsChat");
    let enforces_secure_chat = v.get_bool("enforcesSecureChat");

    Ok(StatusRecord {
        shape: ResponseShape::Netty,

        description_json,
        description_plaintext,
        version_name,
        version_protocol,

        favicon,
        favicon_hash,

        online_players,
        max_players,
        is_online_mode,
        player_sample,
        is_fake_sample,

        enforces_secure_chat,
        previews_chat,
    })
}

fn make_favicon_hash(favicon: &str) -> [u8; 16] {
    let mut hasher = sha2::Sha256::new();
    hasher.update(favicon.as_bytes());
    let result = hasher.finalize();
    let mut hash = [0; 16];
    hash.copy_from_slice(&result[..16]);
    hash
}

#[cfg(test)]
pub(super) mod test {
    use super::*;
    use crate::protocols::write_varint;

    /// Frame a JSON string the way a 1.7+ server does.
    pub fn status_response(json: &str) -> Vec<u8> {
        let mut data = vec![0x00];
        write_varint(&mut data, json.len() as i32);
        data.extend_from_slice(json.as_bytes());

        let mut packet = Vec::new();
        write_varint(&mut packet, data.len() as i32);
        packet.extend(data);
        packet
    }

    #[test]
    fn test_read_varint() {
        assert_eq!(read_varint(&mut Cursor::new([0xac, 0x02])), Some(300));
        assert_eq!(read_varint(&mut Cursor::new([0x80])), None);
        assert_eq!(read_varint(&mut Cursor::new([0xff; 6])), None);
    }

    #[test]
    fn test_decode_status() {
        let response = status_response(
            r#"{"version":{"name":"Paper 1.20.4","protocol":765},"players":{"max":100,"online":2,"sample":[{"name":"alice","id":"e8f5b8a4-3c5e-4b0e-9a4e-3f2b1c0d9e8f"},{"name":"bob","id":"0d9e8f3f-2b1c-4a4e-8b0e-3c5ee8f5b8a4"}]},"description":{"text":"A ","extra":[{"text":"Server"}]},"enforcesSecureChat":true}"#,
        );

        let status = MinecraftDecoder.decode(&response).unwrap();
        assert_eq!(status.shape, ResponseShape::Netty);
        assert_eq!(status.description_plaintext, "A Server");
        assert_eq!(status.version_name.as_deref(), Some("Paper 1.20.4"));
        assert_eq!(status.version_protocol, Some(765));
        assert_eq!(status.online_players, Some(2));
        assert_eq!(status.max_players, Some(100));
        assert_eq!(status.player_sample.len(), 2);
        assert_eq!(status.player_sample[0].name, "alice");
        assert_eq!(status.is_online_mode, Some(true));
        assert!(!status.is_fake_sample);
        assert_eq!(status.enforces_secure_chat, Some(true));
        assert_eq!(status.previews_chat, None);
        assert_eq!(status.favicon, None);
    }

    #[test]
    fn test_duplicate_uuids_are_fake() {
        let response = status_response(
            r#"{"players":{"max":1,"online":2,"sample":[{"name":"a","id":"e8f5b8a4-3c5e-4b0e-9a4e-3f2b1c0d9e8f"},{"name":"b","id":"e8f5b8a4-3c5e-4b0e-9a4e-3f2b1c0d9e8f"}]}}"#,
        );

        let status = MinecraftDecoder.decode(&response).unwrap();
        assert_eq!(status.player_sample.len(), 1);
        assert!(status.is_fake_sample);
    }

    #[test]
    fn test_favicon_must_be_png() {
        let response = status_response(
            r#"{"description":"x","favicon":"data:image/png;base64,AAAA"}"#,
        );
        let status = MinecraftDecoder.decode(&response).unwrap();
        assert_eq!(status.favicon.as_deref(), Some("data:image/png;base64,AAAA"));
        assert!(status.favicon_hash.is_some());

        let response = status_response(r#"{"description":"x","favicon":"http://a/b.png"}"#);
        let status = MinecraftDecoder.decode(&response).unwrap();
        assert_eq!(status.favicon, None);
        assert_eq!(status.favicon_hash, None);
    }

    #[test]
    fn test_rejects_non_status_json() {
        assert_eq!(
            MinecraftDecoder.decode(&status_response(r#"{"hello":"world"}"#)),
            Err(ParseResponseError::Invalid)
        );
        assert_eq!(
            MinecraftDecoder.decode(&status_response("[1, 2, 3]")),
            Err(ParseResponseError::Invalid)
        );
    }

    #[test]
    fn test_truncated_response_is_incomplete() {
        let mut response = status_response(r#"{"description":"a long enough description"}"#);
        response.truncate(response.len() - 5);
        assert!(matches!(
            MinecraftDecoder.decode(&response),
            Err(ParseResponseError::Incomplete { .. })
        ));
    }
}
