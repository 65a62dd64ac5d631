use serde::Serialize;
use uuid::Uuid;

/// Which response layout a [`StatusRecord`] was decoded from. This is
/// decided by the bytes the server sent, not by the query we sent it.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
pub enum ResponseShape {
    /// VarInt-framed JSON, 1.7 and newer.
    #[serde(rename = "1_7")]
    Netty,
    /// `§1` kick packet with a 1.6 protocol version.
    #[serde(rename = "1_6")]
    Legacy16,
    /// `§1` kick packet, 1.4 and 1.5.
    #[serde(rename = "1_4")]
    Legacy14,
    /// `motd§online§max` kick packet, beta 1.8 to 1.3.
    #[serde(rename = "pre_1_4")]
    Beta,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatusRecord {
    pub shape: ResponseShape,

    /// The raw chat component, only present for JSON responses.
    pub description_json: Option<String>,
    pub description_plaintext: String,
    pub version_name: Option<String>,
    pub version_protocol: Option<i32>,

    pub favicon: Option<String>,
    #[serde(skip)]
    pub favicon_hash: Option<[u8; 16]>,

    pub online_players: Option<i32>,
    pub max_players: Option<i32>,
    pub is_online_mode: Option<bool>,
    pub player_sample: Vec<SamplePlayer>,
    /// Whether the sample doesn't seem real.
    pub is_fake_sample: bool,

    pub enforces_secure_chat: Option<bool>,
    pub previews_chat: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SamplePlayer {
    pub name: String,
    pub uuid: Uuid,
}

impl StatusRecord {
    /// A record for the legacy kick-packet responses, which only carry a
    /// handful of fields.
    pub fn legacy(
        shape: ResponseShape,
        motd: String,
        version_name: Option<String>,
        version_protocol: Option<i32>,
        online_players: i32,
        max_players: i32,
    ) -> Self {
        Self {
            shape,
            description_json: None,
            description_plaintext: motd,
            version_name,
            version_protocol,
            favicon: None,
            favicon_hash: None,
            online_players: Some(online_players),
            max_players: Some(max_players),
            is_online_mode: None,
            player_sample: Vec::new(),
            is_fake_sample: false,
            enforces_secure_chat: None,
            previews_chat: None,
        }
    }
}
