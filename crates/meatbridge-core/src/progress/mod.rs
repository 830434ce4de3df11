//! What the player has been granted and credited for
//!
//! The [`ProgressionModel`] only moves forward during a session: worlds,
//! characters, tokens and dark access are added, never removed. The
//! [`Outbox`] tracks which locations were already reported.

mod outbox;

pub use outbox::{LocationSink, Outbox};

use std::collections::{BTreeSet, HashMap, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::config::SlotOptions;
use crate::game::{ItemEffect, ItemId, LevelRef, item_effect, item_name};

/// Regular levels per region
const REGION_LEVELS: u32 = 20;

/// Worlds with boss token gates
const TOKEN_WORLDS: usize = 6;

/// Worlds with dark access items
const DARK_ACCESS_WORLDS: usize = 5;

/// Result of applying one inbound item
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The item was applied
    Applied(ItemEffect),
    /// The item index was already processed in this session
    Replayed,
    /// The item id is not in the item table
    Unknown,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressionModel {
    allowed_worlds: BTreeSet<u8>,
    bandage_count: u32,
    character_bits: u32,
    boss_tokens: [u32; TOKEN_WORLDS],
    bosses_unlocked: [bool; TOKEN_WORLDS],
    dark_access: [u32; DARK_ACCESS_WORLDS],
    /// Real best times hidden while a dark level is locked
    real_times: HashMap<LevelRef, f32>,
    /// Light levels whose best time was written by the bridge
    synthetic: HashSet<LevelRef>,
    next_item_index: u64,
}

impl Default for ProgressionModel {
    fn default() -> Self {
        Self {
            allowed_worlds: BTreeSet::from([1]),
            bandage_count: 0,
            character_bits: 1,
            boss_tokens: [0; TOKEN_WORLDS],
            bosses_unlocked: [false; TOKEN_WORLDS],
            dark_access: [0; DARK_ACCESS_WORLDS],
            real_times: HashMap::new(),
            synthetic: HashSet::new(),
            next_item_index: 0,
        }
    }
}

impl ProgressionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the item received at `index` of the server's item list
    ///
    /// Items below the next expected index were already applied and are skipped,
    /// so a reconnect that replays the whole list grants nothing twice.
    pub fn apply_item(&mut self, index: u64, item: ItemId, options: &SlotOptions) -> Grant {
        if index < self.next_item_index {
            debug!("Skipping replayed item #{} ({})", index, item_name(item));
            return Grant::Replayed;
        }
        self.next_item_index = index + 1;

        let Some(effect) = item_effect(item) else {
            debug!("Ignoring unknown item {}", item);
            return Grant::Unknown;
        };

        match effect {
            ItemEffect::GrantWorld(world) => {
                self.allowed_worlds.insert(world);
            }
            ItemEffect::GrantBandage => self.bandage_count += 1,
            ItemEffect::GrantCharacter { bit } => self.character_bits |= 1 << bit,
            ItemEffect::GrantBossToken(world) => self.add_boss_token(world, options),
            ItemEffect::GrantDarkAccess(world) => {
                let slot = (world as usize).checked_sub(1);
                if let Some(count) = slot.and_then(|i| self.dark_access.get_mut(i)) {
                    *count += 1;
                }
            }
            ItemEffect::Filler => {}
        }

        debug!("Applied {}", item_name(item));
        Grant::Applied(effect)
    }

    fn add_boss_token(&mut self, world: u8, options: &SlotOptions) {
        let Some(i) = (world as usize).checked_sub(1).filter(|&i| i < TOKEN_WORLDS) else {
            return;
        };
        self.boss_tokens[i] += 1;

        let cost = options.boss_token_cost(world);
        if options.tokens_enabled()
            && cost > 0
            && !self.bosses_unlocked[i]
            && self.boss_tokens[i] >= cost
        {
            self.bosses_unlocked[i] = true;
            info!("World {} boss unlocked ({} tokens)", world, cost);
        }
    }

    pub fn allowed_worlds(&self) -> impl Iterator<Item = u8> + '_ {
        self.allowed_worlds.iter().copied()
    }

    pub fn is_world_allowed(&self, world: u8) -> bool {
        self.allowed_worlds.contains(&world)
    }

    /// World unlock byte as stored by the game
    pub fn world_mask(&self) -> u8 {
        self.allowed_worlds
            .iter()
            .filter(|w| (1..=8).contains(*w))
            .fold(0, |mask, w| mask | 1 << (w - 1))
    }

    pub fn bandage_count(&self) -> u32 {
        self.bandage_count
    }

    pub fn character_bits(&self) -> u32 {
        self.character_bits
    }

    pub fn boss_tokens(&self, world: u8) -> u32 {
        (world as usize)
            .checked_sub(1)
            .and_then(|i| self.boss_tokens.get(i))
            .copied()
            .unwrap_or(0)
    }

    pub fn boss_unlocked(&self, world: u8) -> bool {
        (world as usize)
            .checked_sub(1)
            .and_then(|i| self.bosses_unlocked.get(i))
            .copied()
            .unwrap_or(false)
    }

    pub fn dark_access(&self, world: u8) -> u32 {
        (world as usize)
            .checked_sub(1)
            .and_then(|i| self.dark_access.get(i))
            .copied()
            .unwrap_or(0)
    }

    /// Number of leading light levels of `world` whose dark level is open
    pub fn dark_unlocked(&self, world: u8, per_world: u8) -> u8 {
        let per_world = u32::from(per_world.max(1));
        let open = self.dark_access(world) * REGION_LEVELS / per_world;
        open.min(REGION_LEVELS) as u8
    }

    pub fn next_item_index(&self) -> u64 {
        self.next_item_index
    }

    pub fn real_time(&self, level: LevelRef) -> Option<f32> {
        self.real_times.get(&level).copied()
    }

    pub fn shadow_time(&mut self, level: LevelRef, time: f32) {
        self.real_times.insert(level, time);
    }

    pub fn take_real_time(&mut self, level: LevelRef) -> Option<f32> {
        self.real_times.remove(&level)
    }

    pub fn is_synthetic(&self, level: LevelRef) -> bool {
        self.synthetic.contains(&level)
    }

    pub fn mark_synthetic(&mut self, level: LevelRef) {
        self.synthetic.insert(level);
    }

    pub fn clear_synthetic(&mut self, level: LevelRef) -> bool {
        self.synthetic.remove(&level)
    }
}
