use serde::Serialize;
use strum::Display;

use crate::game::region::{LevelRef, Region};
use crate::process::layout::state;

/// Live game state read once per poll cycle
///
/// Comparing two consecutive snapshots is the only way the bridge detects
/// transitions; no snapshot is ever reused across cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameStateSnapshot {
    pub playing: bool,
    pub world: u8,
    /// Raw level byte; `None` when the level pointer is null or unreadable
    pub level: Option<u8>,
    pub beaten: bool,
    pub level_type: i32,
    pub ui_state: i32,
    pub transition: u8,
}

/// Coarse screen classification, used for logging and the status command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum Screen {
    #[strum(serialize = "In level")]
    InLevel,
    #[strum(serialize = "Boss / map")]
    BossOrMap,
    #[strum(serialize = "World select")]
    WorldSelect,
    #[strum(serialize = "Level select")]
    LevelSelect,
    #[strum(serialize = "Other")]
    Other,
}

impl GameStateSnapshot {
    pub fn region(&self) -> Option<Region> {
        Region::from_level_type(self.level_type)
    }

    /// Level index when the level byte names a real level rather than the map/boss sentinel
    pub fn actual_level(&self) -> Option<u8> {
        self.level.filter(|l| *l < state::MAP_OR_BOSS_LEVEL)
    }

    pub fn is_boss_or_map(&self) -> bool {
        self.level == Some(state::MAP_OR_BOSS_LEVEL)
    }

    /// Save slot of the level being played
    ///
    /// Warp levels report the world only; the slot inside the zone is not exposed
    /// by the game, so warp play yields `None` here and is tracked per world.
    pub fn level_ref(&self) -> Option<LevelRef> {
        let region = self.region()?;
        if region.is_warp() {
            return None;
        }
        Some(LevelRef::new(self.world, self.actual_level()?, region))
    }

    pub fn in_warp(&self) -> bool {
        self.region().is_some_and(|r| r.is_warp())
    }

    pub fn valid_world(&self) -> bool {
        (1..=7).contains(&self.world)
    }

    pub fn on_world_select(&self) -> bool {
        let on_map = self.level == Some(state::MAP_OR_BOSS_LEVEL)
            && self.ui_state == state::UI_WORLD_MAP
            && self.transition == 0;
        on_map || (self.level == Some(0) && !self.playing)
    }

    pub fn on_level_select(&self) -> bool {
        !self.playing && self.ui_state == state::UI_LEVEL_SELECT && self.valid_world()
    }

    pub fn screen(&self) -> Screen {
        if self.playing && self.is_boss_or_map() {
            Screen::BossOrMap
        } else if self.playing {
            Screen::InLevel
        } else if self.on_level_select() {
            Screen::LevelSelect
        } else if self.on_world_select() {
            Screen::WorldSelect
        } else {
            Screen::Other
        }
    }
}
