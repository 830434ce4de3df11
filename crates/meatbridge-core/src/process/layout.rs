//! Memory layout constants for Super Meat Boy (Steam, v1.2.5)
//!
//! This module centralizes the addresses the bridge reads and patches. Global
//! state lives at fixed offsets from the main module; per-level progress lives in
//! the save block, reached through a pointer.
//!
//! # Memory Structure Overview
//!
//! - **Game state**: play flag, world, level, beaten flag, level type, UI state
//! - **Save block**: one 12-byte slot per level plus world/character/boss gating fields

/// Module-relative addresses of live game state
///
/// # Layout
///
/// ```text
/// Address      Kind                 Size   Description
/// ──────────────────────────────────────────────────────────────────
/// 0x30A1C8     direct               1      1 while a level is being played
/// 0x2F79AC     direct               1      Current world (1-7)
/// 0x30A1E0     direct               1      Set when the current level is beaten
/// 0x30AC90     ptr → +0x8DC         1      Current level index (99 = map/boss)
/// 0x30A1A0     ptr → +0x3C68        4      Level type (0 light, 1 dark, 2-5 warp)
/// 0x30AC90     ptr → +0x8E0         4      UI state (1 level select, 3 world map)
/// 0x30A380     direct               4      Pointer to the save block
/// 0x30AD00     direct               1      Non-zero during screen transitions
/// ```
pub mod state {
    pub const PLAYING: u64 = 0x30A1C8;
    pub const WORLD: u64 = 0x2F79AC;
    pub const LEVEL_BEATEN: u64 = 0x30A1E0;

    pub const LEVEL_PTR: u64 = 0x30AC90;
    pub const LEVEL_OFFSET: u64 = 0x8DC;

    pub const LEVEL_TYPE_PTR: u64 = 0x30A1A0;
    pub const LEVEL_TYPE_OFFSET: u64 = 0x3C68;

    pub const UI_STATE_PTR: u64 = 0x30AC90;
    pub const UI_STATE_OFFSET: u64 = 0x8E0;

    pub const SAVE_PTR: u64 = 0x30A380;
    pub const TRANSITION: u64 = 0x30AD00;

    /// Level byte while on the world map or inside a boss fight
    pub const MAP_OR_BOSS_LEVEL: u8 = 99;

    pub const UI_LEVEL_SELECT: i32 = 1;
    pub const UI_WORLD_MAP: i32 = 3;
}

/// Level type codes stored behind `state::LEVEL_TYPE_PTR`
pub mod level_type {
    pub const LIGHT: i32 = 0;
    pub const DARK: i32 = 1;
    pub const WARP_MIN: i32 = 2;
    pub const WARP_MAX: i32 = 5;
}

/// Save block layout
///
/// # Slot Layout
///
/// ```text
/// Offset   Field        Size   Description
/// ─────────────────────────────────────────────────
/// 0x00     best_time    4      f32 best time in seconds (0 = never finished)
/// 0x04     completion   1      Flags, see `flags`
/// 0x05     (padding)    7
/// ```
///
/// World blocks start at `WORLD_BASES[w - 1]`; light, dark and warp slots follow at
/// fixed region offsets. World 6 is packed (5 light + 5 dark, no warps) which pushes
/// world 7 down to 0xD08.
pub mod save {
    pub const WORLD_BASES: [u64; 7] = [0x060, 0x2D0, 0x540, 0x7B0, 0xA20, 0xC90, 0xD08];

    pub const LIGHT_OFFSET: u64 = 0x000;
    pub const DARK_OFFSET: u64 = 0x0F0;
    pub const WARP_OFFSET: u64 = 0x1E0;
    pub const W6_DARK_OFFSET: u64 = 0x03C;

    pub const SLOT_SIZE: u64 = 0x0C;
    pub const TIME_FIELD: u64 = 0x00;
    pub const COMPLETION_FIELD: u64 = 0x04;

    pub const WARP_SLOTS: usize = 12;

    /// Byte bitmask of worlds the map lets the player enter
    pub const WORLD_UNLOCK: u64 = 0x3954;

    /// u32 bitmask of playable characters
    pub const CHARACTER_BITMASK: u64 = 0x3950;

    /// Boss door counters for worlds 1-6
    pub const BOSS_COUNTERS: [u64; 6] = [0x38D8, 0x38E4, 0x38F0, 0x38FC, 0x3908, 0x3914];

    /// Counter value at which the game opens each boss door
    pub const BOSS_THRESHOLDS: [u8; 6] = [17, 17, 17, 17, 17, 5];
}

/// Completion byte flags
pub mod flags {
    pub const BANDAGE: u8 = 0x01;
    pub const COMPLETE: u8 = 0x02;
    /// Warp portal entered on a host level
    pub const WARP_FOUND: u8 = 0x08;
}
