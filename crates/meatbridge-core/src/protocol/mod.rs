//! Multiworld server protocol
//!
//! Frames are JSON arrays of messages; every message is an object tagged by its
//! `cmd` field. Decoding is lenient: a frame that is not an array, or a message
//! that does not match its command's shape, is dropped with a warning.

mod session;

pub use session::{ClientSession, ServerEvent, SessionOutput, SessionState};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::session as session_config;
use crate::error::Result;
use crate::game::{ItemId, LocationId};

/// Commands sent to the server
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "cmd")]
pub enum ClientCommand {
    Connect {
        password: String,
        game: String,
        name: String,
        uuid: String,
        version: NetworkVersion,
        items_handling: u8,
        tags: Vec<String>,
        slot_data: bool,
    },
    GetDataPackage {
        #[serde(skip_serializing_if = "Vec::is_empty")]
        games: Vec<String>,
    },
    LocationChecks {
        locations: Vec<LocationId>,
    },
    StatusUpdate {
        status: u8,
    },
}

impl ClientCommand {
    pub fn connect(slot: &str, password: &str, uuid: String) -> Self {
        Self::Connect {
            password: password.to_string(),
            game: session_config::GAME_NAME.to_string(),
            name: slot.to_string(),
            uuid,
            version: NetworkVersion::client(),
            items_handling: session_config::ITEMS_HANDLING,
            tags: Vec::new(),
            slot_data: true,
        }
    }

    pub fn goal_complete() -> Self {
        Self::StatusUpdate {
            status: session_config::GOAL_STATUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkVersion {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    #[serde(rename = "class")]
    pub class: String,
}

impl NetworkVersion {
    pub fn client() -> Self {
        let (major, minor, build) = session_config::CLIENT_VERSION;
        Self {
            major,
            minor,
            build,
            class: "Version".to_string(),
        }
    }
}

/// Messages received from the server
///
/// Commands the bridge has no use for decode as [`ServerMessage::Other`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "cmd")]
pub enum ServerMessage {
    RoomInfo {
        #[serde(default)]
        games: Vec<String>,
    },
    DataPackage {
        data: DataPackage,
    },
    Connected {
        #[serde(default)]
        slot: i64,
        #[serde(default)]
        players: Vec<NetworkPlayer>,
        #[serde(default)]
        checked_locations: Vec<LocationId>,
        #[serde(default)]
        slot_data: serde_json::Value,
    },
    ReceivedItems {
        index: u64,
        items: Vec<NetworkItem>,
    },
    RoomUpdate {
        #[serde(default)]
        checked_locations: Vec<LocationId>,
        #[serde(default)]
        players: Vec<NetworkPlayer>,
    },
    #[serde(rename = "PrintJSON")]
    PrintJson {
        #[serde(default)]
        data: Vec<JsonTextPart>,
    },
    ConnectionRefused {
        #[serde(default)]
        errors: Vec<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkItem {
    pub item: ItemId,
    #[serde(default)]
    pub location: LocationId,
    #[serde(default)]
    pub player: i64,
    #[serde(default)]
    pub flags: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NetworkPlayer {
    #[serde(default)]
    pub team: i64,
    pub slot: i64,
    #[serde(default)]
    pub alias: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DataPackage {
    #[serde(default)]
    pub games: HashMap<String, GameData>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub item_name_to_id: HashMap<String, ItemId>,
    #[serde(default)]
    pub location_name_to_id: HashMap<String, LocationId>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct JsonTextPart {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: String,
}

/// Decode one frame, dropping anything malformed
pub fn decode_frame(text: &str) -> Vec<ServerMessage> {
    let values: Vec<serde_json::Value> = match serde_json::from_str(text) {
        Ok(values) => values,
        Err(e) => {
            warn!("Dropping malformed frame: {}", e);
            return Vec::new();
        }
    };

    values
        .into_iter()
        .filter_map(|value| {
            let cmd = value
                .get("cmd")
                .and_then(|c| c.as_str())
                .unwrap_or("?")
                .to_string();
            match serde_json::from_value(value) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!("Dropping malformed {} message: {}", cmd, e);
                    None
                }
            }
        })
        .collect()
}

pub fn encode_frame(commands: &[ClientCommand]) -> Result<String> {
    Ok(serde_json::to_string(commands)?)
}

/// Websocket URL for a server address, defaulting to `wss://`
pub fn server_url(address: &str) -> String {
    let address = address.trim();
    if address.starts_with("ws://") || address.starts_with("wss://") {
        address.to_string()
    } else {
        format!("wss://{}", address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_shape() {
        let command = ClientCommand::connect("Meaty", "", "abc".to_string());
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["cmd"], "Connect");
        assert_eq!(value["game"], "Super Meat Boy");
        assert_eq!(value["name"], "Meaty");
        assert_eq!(value["items_handling"], 7);
        assert_eq!(value["slot_data"], true);
        assert_eq!(value["version"]["class"], "Version");
        assert_eq!(value["version"]["minor"], 5);
    }

    #[test]
    fn test_encode_frame_is_array() {
        let text = encode_frame(&[
            ClientCommand::LocationChecks {
                locations: vec![7_700_001],
            },
            ClientCommand::goal_complete(),
        ])
        .unwrap();
        assert_eq!(
            text,
            r#"[{"cmd":"LocationChecks","locations":[7700001]},{"cmd":"StatusUpdate","status":30}]"#
        );
    }

    #[test]
    fn test_get_data_package_omits_empty_games() {
        let text = encode_frame(&[ClientCommand::GetDataPackage { games: vec![] }]).unwrap();
        assert_eq!(text, r#"[{"cmd":"GetDataPackage"}]"#);
    }

    #[test]
    fn test_decode_received_items() {
        let messages = decode_frame(
            r#"[{"cmd":"ReceivedItems","index":3,"items":[{"item":7700005,"location":12,"player":2,"flags":0}]}]"#,
        );
        assert_eq!(
            messages,
            vec![ServerMessage::ReceivedItems {
                index: 3,
                items: vec![NetworkItem {
                    item: 7_700_005,
                    location: 12,
                    player: 2,
                    flags: 0,
                }],
            }]
        );
    }

    #[test]
    fn test_unknown_commands_decode_as_other() {
        let messages = decode_frame(r#"[{"cmd":"Bounced","data":{}},{"cmd":"Retrieved"}]"#);
        assert_eq!(messages, vec![ServerMessage::Other, ServerMessage::Other]);
    }

    #[test]
    fn test_malformed_input_is_dropped() {
        assert!(decode_frame("not json").is_empty());
        assert!(decode_frame(r#"{"cmd":"RoomInfo"}"#).is_empty());

        // The bad message goes, its neighbour stays
        let messages =
            decode_frame(r#"[{"cmd":"ReceivedItems","index":"x"},{"cmd":"RoomInfo","games":[]}]"#);
        assert_eq!(messages, vec![ServerMessage::RoomInfo { games: vec![] }]);
    }

    #[test]
    fn test_print_json_parts() {
        let messages =
            decode_frame(r#"[{"cmd":"PrintJSON","data":[{"text":"Hi "},{"type":"player_id","text":"1"}]}]"#);
        let ServerMessage::PrintJson { data } = &messages[0] else {
            panic!("expected PrintJSON");
        };
        assert_eq!(data[0].kind, None);
        assert_eq!(data[1].kind.as_deref(), Some("player_id"));
    }

    #[test]
    fn test_server_url() {
        assert_eq!(server_url("archipelago.gg:38281"), "wss://archipelago.gg:38281");
        assert_eq!(server_url("ws://localhost:38281"), "ws://localhost:38281");
        assert_eq!(server_url(" wss://host:1 "), "wss://host:1");
    }
}
