use std::time::Instant;

use crate::config::SlotOptions;
use crate::game::GameStateSnapshot;
use crate::game::locations::{DARK_BOSS, LocationId, boss_location};
use crate::process::layout::state;

/// A confirmed boss kill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BossDefeat {
    pub world: u8,
    /// Dark Dr. Fetus (world 6, dark)
    pub dark: bool,
}

impl BossDefeat {
    /// Location credited for the kill
    ///
    /// The dark boss has its own location only when dark levels are locations;
    /// otherwise it counts as the regular world 6 boss. World 7 has none.
    pub fn location(&self, options: &SlotOptions) -> Option<LocationId> {
        if self.dark && options.dark_world_levels {
            Some(DARK_BOSS)
        } else {
            boss_location(self.world)
        }
    }
}

/// Play ended on a boss level; not yet known whether the boss died
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingBoss {
    pub world: u8,
    pub dark: bool,
    pub observed_at: Instant,
}

impl PendingBoss {
    pub fn new(world: u8, dark: bool, observed_at: Instant) -> Self {
        Self {
            world,
            dark,
            observed_at,
        }
    }

    /// World 6 returns to the map on its own; other worlds show the world map UI
    pub fn confirmed_by(&self, cur: &GameStateSnapshot) -> bool {
        if cur.playing {
            return false;
        }
        self.world == 6 || cur.ui_state == state::UI_WORLD_MAP
    }

    pub fn defeat(&self) -> BossDefeat {
        BossDefeat {
            world: self.world,
            dark: self.dark,
        }
    }
}
