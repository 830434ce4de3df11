use std::collections::HashMap;

use strum::Display;
use tracing::{info, warn};

use crate::config::SlotOptions;
use crate::game::{ItemId, LocationId, item_name, location_name};

use super::{ClientCommand, DataPackage, JsonTextPart, NetworkPlayer, ServerMessage};

/// What the bridge needs to know from the server, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Connected {
        checked_locations: Vec<LocationId>,
        options: SlotOptions,
    },
    /// Locations the server reports as checked, e.g. by a co-op partner
    LocationsChecked { ids: Vec<LocationId> },
    ReceivedItem { index: u64, item: ItemId, player: i64 },
    ConnectionRefused { reasons: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionState {
    #[strum(serialize = "waiting for room info")]
    AwaitingRoomInfo,
    #[strum(serialize = "connecting")]
    Connecting,
    #[strum(serialize = "connected")]
    Connected,
    #[strum(serialize = "refused")]
    Refused,
}

#[derive(Debug, Default, PartialEq)]
pub struct SessionOutput {
    pub commands: Vec<ClientCommand>,
    pub events: Vec<ServerEvent>,
}

/// Client side of the handshake, without any I/O
///
/// Feed it decoded server messages; it answers with the commands to send and
/// the events to hand to the bridge.
#[derive(Debug)]
pub struct ClientSession {
    slot: String,
    password: String,
    uuid: String,
    state: SessionState,
    players: HashMap<i64, String>,
    item_names: HashMap<ItemId, String>,
    location_names: HashMap<LocationId, String>,
}

impl ClientSession {
    pub fn new(slot: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            password: password.into(),
            uuid: uuid::Uuid::new_v4().to_string(),
            state: SessionState::AwaitingRoomInfo,
            players: HashMap::new(),
            item_names: HashMap::new(),
            location_names: HashMap::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn handle(&mut self, message: ServerMessage) -> SessionOutput {
        let mut output = SessionOutput::default();

        match message {
            ServerMessage::RoomInfo { games } => {
                info!("Connected to room, requesting data");
                output.commands.push(ClientCommand::GetDataPackage { games });
                output.commands.push(ClientCommand::connect(
                    &self.slot,
                    &self.password,
                    self.uuid.clone(),
                ));
                self.state = SessionState::Connecting;
            }
            ServerMessage::DataPackage { data } => self.record_names(data),
            ServerMessage::Connected {
                slot,
                players,
                checked_locations,
                slot_data,
            } => {
                self.record_players(players);
                let options = SlotOptions::from_value(slot_data).unwrap_or_else(|e| {
                    warn!("Unusable slot data, using defaults: {}", e);
                    SlotOptions::default()
                });
                info!(
                    "Connected as {} (slot {}), {} locations already checked",
                    self.slot,
                    slot,
                    checked_locations.len()
                );
                log_options(&options);
                self.state = SessionState::Connected;
                output.events.push(ServerEvent::Connected {
                    checked_locations,
                    options,
                });
            }
            ServerMessage::ReceivedItems { index, items } => {
                for (offset, item) in items.into_iter().enumerate() {
                    info!(
                        "Received {} from {}",
                        self.item_name(item.item),
                        self.player_name(item.player)
                    );
                    output.events.push(ServerEvent::ReceivedItem {
                        index: index + offset as u64,
                        item: item.item,
                        player: item.player,
                    });
                }
            }
            ServerMessage::RoomUpdate {
                checked_locations,
                players,
            } => {
                self.record_players(players);
                if !checked_locations.is_empty() {
                    output.events.push(ServerEvent::LocationsChecked {
                        ids: checked_locations,
                    });
                }
            }
            ServerMessage::PrintJson { data } => {
                let text = self.render(&data);
                if !text.is_empty() {
                    info!("[Server] {}", text);
                }
            }
            ServerMessage::ConnectionRefused { errors } => {
                let reasons = if errors.is_empty() {
                    vec!["Unknown error".to_string()]
                } else {
                    errors
                };
                warn!("Connection refused: {}", reasons.join(", "));
                self.state = SessionState::Refused;
                output.events.push(ServerEvent::ConnectionRefused { reasons });
            }
            ServerMessage::Other => {}
        }

        output
    }

    pub fn item_name(&self, id: ItemId) -> String {
        self.item_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| item_name(id))
    }

    pub fn location_name(&self, id: LocationId) -> String {
        self.location_names
            .get(&id)
            .cloned()
            .unwrap_or_else(|| location_name(id))
    }

    pub fn player_name(&self, slot: i64) -> String {
        match self.players.get(&slot) {
            Some(name) => name.clone(),
            None if slot == 0 => "Server".to_string(),
            None => format!("Player {}", slot),
        }
    }

    fn record_names(&mut self, data: DataPackage) {
        let games = data.games.len();
        for game in data.games.into_values() {
            self.item_names.extend(
                game.item_name_to_id
                    .into_iter()
                    .map(|(name, id)| (id, name)),
            );
            self.location_names.extend(
                game.location_name_to_id
                    .into_iter()
                    .map(|(name, id)| (id, name)),
            );
        }
        info!("Loaded data for {} game(s)", games);
    }

    fn record_players(&mut self, players: Vec<NetworkPlayer>) {
        for player in players {
            self.players.insert(player.slot, player.name);
        }
    }

    /// Flatten a PrintJSON message, resolving player, item and location ids
    fn render(&self, parts: &[JsonTextPart]) -> String {
        parts
            .iter()
            .map(|part| {
                let id = part.text.parse::<i64>().ok();
                match (part.kind.as_deref(), id) {
                    (Some("player_id"), Some(id)) => self.player_name(id),
                    (Some("item_id"), Some(id)) => self.item_name(id),
                    (Some("location_id"), Some(id)) => self.location_name(id),
                    _ => part.text.clone(),
                }
            })
            .collect()
    }
}

fn log_options(options: &SlotOptions) {
    info!("  Goal: {}", options.goal);
    let toggles = [
        ("Dark world levels", options.dark_world_levels),
        ("A+ locations", options.aplus_locations),
        ("Cotton Alley", options.w7_locations),
        ("Character warp locations", options.character_warp_locations),
        ("Warp completion locations", options.warp_completion_locations),
        ("Achievement locations", options.achievement_locations),
        ("Dark lock", options.dark_lock_mode),
        ("Require all bosses", options.require_all_bosses),
    ];
    for (name, _) in toggles.iter().filter(|(_, on)| *on) {
        info!("  {}: enabled", name);
    }
    if options.bandages_required > 0 {
        info!("  Bandages required: {}", options.bandages_required);
    }
    if options.tokens_enabled() {
        let costs: Vec<String> = (1..=6)
            .map(|w| format!("W{}={}", w, options.boss_token_cost(w)))
            .collect();
        info!("  Boss tokens: {}", costs.join(", "));
    }
}
