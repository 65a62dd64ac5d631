use super::QueryEncoder;

/// The protocol version 1.6.4 clients send in `MC|PingHost`.
const PING_HOST_PROTOCOL_VERSION: u8 = 74;

/// 1.6 server list ping. Older servers ignore everything after `FE 01`, so
/// this also reaches 1.4 and 1.5 servers.
pub struct Legacy16;

impl QueryEncoder for Legacy16 {
    fn payload(&self, hostname: &str, port: u16) -> Vec<u8> {
        let hostname = utf16_be(hostname);

        let mut buffer = vec![
            0xfe, // server list ping
            0x01, // payload (always 1)
            0xfa, // plugin message
        ];
        write_utf16_string(&mut buffer, &utf16_be("MC|PingHost"));
        // length of the rest of the data: protocol byte, string length, hostname, port
        buffer.extend_from_slice(&(7 + hostname.len() as u16).to_be_bytes());
        buffer.push(PING_HOST_PROTOCOL_VERSION);
        write_utf16_string(&mut buffer, &hostname);
        buffer.extend_from_slice(&(port as i32).to_be_bytes());

        buffer
    }
}

/// 1.4 and 1.5 server list ping.
pub struct Legacy14;

impl QueryEncoder for Legacy14 {
    fn payload(&self, _hostname: &str, _port: u16) -> Vec<u8> {
        vec![0xfe, 0x01]
    }
}

fn utf16_be(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(u16::to_be_bytes).collect()
}

/// Strings in the legacy protocol are prefixed with their length in UTF-16
/// code units.
fn write_utf16_string(buffer: &mut Vec<u8>, encoded: &[u8]) {
    buffer.extend_from_slice(&((encoded.len() / 2) as u16).to_be_bytes());
    buffer.extend_from_slice(encoded);
}
