use super::QueryEncoder;

/// The 1.7+ server list ping: a handshake with next state 1 followed by a
/// status request.
#[derive(Clone)]
pub struct Minecraft {
    protocol_version: i32,
}

impl Minecraft {
    pub const fn new(protocol_version: i32) -> Self {
        Self { protocol_version }
    }
}

impl QueryEncoder for Minecraft {
    fn payload(&self, hostname: &str, port: u16) -> Vec<u8> {
        build_latest_request(hostname, port, self.protocol_version)
    }
}

/// https://github.com/kiwiyou/craftping/blob/master/src/lib.rs#L73
pub fn build_latest_request(hostname: &str, port: u16, protocol_version: i32) -> Vec<u8> {
    // buffer for the 1st packet's data part
    let mut buffer = vec![
        // 0 for handshake packet
        0x00,
    ];

    write_varint(&mut buffer, protocol_version); // protocol version

    // Some server implementations require hostname and port to be properly set (Notchian does not)
    write_varint(&mut buffer, hostname.len() as i32); // length of hostname as VarInt
    buffer.extend_from_slice(hostname.as_bytes());
    buffer.extend_from_slice(&[
        (port >> 8) as u8,
        (port & 0b1111_1111) as u8, // server port as unsigned short
        0x01,                       // next state: 1 (status) as VarInt
    ]);
    // buffer for the 1st and 2nd packet
    let mut full_buffer = vec![];
    write_varint(&mut full_buffer, buffer.len() as i32); // length of 1st packet id + data as VarInt
    full_buffer.append(&mut buffer);
    full_buffer.extend_from_slice(&[
        1,    // length of 2nd packet id + data as VarInt
        0x00, // 2nd packet id: 0 for request as VarInt
    ]);

    full_buffer
}

pub fn write_varint(writer: &mut Vec<u8>, mut value: i32) {
    if value == 0 {
        writer.push(0);
    }
    while value != 0 {
        let mut byte = (value & 0b0111_1111) as u8;
        value = (value >> 7) & (i32::MAX >> 6);
        if value != 0 {
            byte |= 0b1000_0000;
        }
        writer.push(byte);
    }
}
