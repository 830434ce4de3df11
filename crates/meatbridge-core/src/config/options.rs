use serde::{Deserialize, Deserializer, Serialize};
use strum::Display;

use crate::error::{Error, Result};

/// Condition that completes the seed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum GoalMode {
    #[default]
    #[strum(serialize = "Beat the Rapture boss")]
    BeatRaptureBoss,
    #[strum(serialize = "Beat all five bosses")]
    BeatAllBosses,
    #[strum(serialize = "Beat Dr. Fetus")]
    BeatDrFetus,
    #[strum(serialize = "Beat Dark Dr. Fetus")]
    BeatDarkDrFetus,
}

impl TryFrom<u8> for GoalMode {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::BeatRaptureBoss),
            1 => Ok(Self::BeatAllBosses),
            2 => Ok(Self::BeatDrFetus),
            3 => Ok(Self::BeatDarkDrFetus),
            other => Err(format!("unknown goal {}", other)),
        }
    }
}

impl From<GoalMode> for u8 {
    fn from(goal: GoalMode) -> Self {
        goal as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BossTokenMode {
    #[default]
    Vanilla,
    Tokens,
}

pub const DEFAULT_DARK_UNLOCKS_PER_WORLD: u8 = 4;

/// Seed options from the `slot_data` of the `Connected` message
///
/// Unknown keys are ignored and missing keys take their defaults. Toggles are
/// accepted as booleans or integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotOptions {
    pub goal: GoalMode,
    #[serde(deserialize_with = "flag")]
    pub dark_world_levels: bool,
    #[serde(deserialize_with = "flag")]
    pub aplus_locations: bool,
    #[serde(deserialize_with = "flag")]
    pub w7_locations: bool,
    #[serde(deserialize_with = "flag")]
    pub character_warp_locations: bool,
    #[serde(deserialize_with = "flag")]
    pub warp_completion_locations: bool,
    #[serde(deserialize_with = "flag")]
    pub achievement_locations: bool,
    pub bandages_required: u32,
    pub boss_token_mode: BossTokenMode,
    pub boss_tokens_w1: u32,
    pub boss_tokens_w2: u32,
    pub boss_tokens_w3: u32,
    pub boss_tokens_w4: u32,
    pub boss_tokens_w5: u32,
    pub boss_tokens_w6: u32,
    #[serde(deserialize_with = "flag")]
    pub require_all_bosses: bool,
    #[serde(deserialize_with = "flag")]
    pub dark_lock_mode: bool,
    pub dark_unlocks_per_world: u8,
}

impl Default for SlotOptions {
    fn default() -> Self {
        Self {
            goal: GoalMode::default(),
            dark_world_levels: false,
            aplus_locations: false,
            w7_locations: false,
            character_warp_locations: false,
            warp_completion_locations: false,
            achievement_locations: false,
            bandages_required: 0,
            boss_token_mode: BossTokenMode::default(),
            boss_tokens_w1: 0,
            boss_tokens_w2: 0,
            boss_tokens_w3: 0,
            boss_tokens_w4: 0,
            boss_tokens_w5: 0,
            boss_tokens_w6: 0,
            require_all_bosses: false,
            dark_lock_mode: false,
            dark_unlocks_per_world: DEFAULT_DARK_UNLOCKS_PER_WORLD,
        }
    }
}

impl SlotOptions {
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(|e| Error::ConfigParseError(e.to_string()))
    }

    pub fn tokens_enabled(&self) -> bool {
        self.boss_token_mode == BossTokenMode::Tokens
    }

    /// Tokens needed to open the boss door of a world, 0 when not token-gated
    pub fn boss_token_cost(&self, world: u8) -> u32 {
        match world {
            1 => self.boss_tokens_w1,
            2 => self.boss_tokens_w2,
            3 => self.boss_tokens_w3,
            4 => self.boss_tokens_w4,
            5 => self.boss_tokens_w5,
            6 => self.boss_tokens_w6,
            _ => 0,
        }
    }

    /// Dark access items needed to open all 20 dark levels of a world
    pub fn dark_unlocks_per_world(&self) -> u8 {
        self.dark_unlocks_per_world.clamp(1, 20)
    }
}

/// Accept `true`/`false` as well as integers (non-zero is true)
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_empty_object() {
        let options = SlotOptions::from_value(json!({})).unwrap();
        assert_eq!(options, SlotOptions::default());
        assert_eq!(options.dark_unlocks_per_world(), 4);
    }

    #[test]
    fn test_flags_accept_bool_and_int() {
        let options = SlotOptions::from_value(json!({
            "dark_world_levels": 1,
            "aplus_locations": true,
            "w7_locations": 0,
            "achievement_locations": false,
        }))
        .unwrap();
        assert!(options.dark_world_levels);
        assert!(options.aplus_locations);
        assert!(!options.w7_locations);
        assert!(!options.achievement_locations);
    }

    #[test]
    fn test_goal_and_tokens() {
        let options = SlotOptions::from_value(json!({
            "goal": 3,
            "boss_token_mode": "tokens",
            "boss_tokens_w1": 3,
            "boss_tokens_w6": 2,
            "bandages_required": 40,
            "unrelated_key": "ignored",
        }))
        .unwrap();
        assert_eq!(options.goal, GoalMode::BeatDarkDrFetus);
        assert!(options.tokens_enabled());
        assert_eq!(options.boss_token_cost(1), 3);
        assert_eq!(options.boss_token_cost(2), 0);
        assert_eq!(options.boss_token_cost(6), 2);
        assert_eq!(options.boss_token_cost(7), 0);
        assert_eq!(options.bandages_required, 40);
    }

    #[test]
    fn test_unknown_goal_rejected() {
        let err = SlotOptions::from_value(json!({ "goal": 9 })).unwrap_err();
        assert!(matches!(err, Error::ConfigParseError(_)));
    }

    #[test]
    fn test_dark_unlocks_clamped() {
        let zero = SlotOptions::from_value(json!({ "dark_unlocks_per_world": 0 })).unwrap();
        assert_eq!(zero.dark_unlocks_per_world(), 1);
        let big = SlotOptions::from_value(json!({ "dark_unlocks_per_world": 50 })).unwrap();
        assert_eq!(big.dark_unlocks_per_world(), 20);
    }

    #[test]
    fn test_goal_display() {
        assert_eq!(GoalMode::BeatAllBosses.to_string(), "Beat all five bosses");
        assert_eq!(BossTokenMode::Tokens.to_string(), "tokens");
    }
}
