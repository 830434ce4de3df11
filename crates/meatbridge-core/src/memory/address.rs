//! Save-block address resolution

use crate::game::{LevelRef, Region, level_count};
use crate::process::layout::save;

/// Offset of a slot's first byte inside the save block
///
/// Returns `None` for an unknown world, a region the world does not have, or an
/// index past the end of the region.
pub fn resolve(level: LevelRef) -> Option<u64> {
    let world_base = *save::WORLD_BASES.get(level.world.checked_sub(1)? as usize)?;
    if level.index >= level_count(level.world, level.region) {
        return None;
    }
    let region_offset = match (level.world, level.region) {
        (6, Region::Dark) => save::W6_DARK_OFFSET,
        (_, Region::Light) => save::LIGHT_OFFSET,
        (_, Region::Dark) => save::DARK_OFFSET,
        (_, Region::Warp) => save::WARP_OFFSET,
    };
    Some(world_base + region_offset + level.index as u64 * save::SLOT_SIZE)
}

pub fn completion_offset(level: LevelRef) -> Option<u64> {
    resolve(level).map(|slot| slot + save::COMPLETION_FIELD)
}

pub fn time_offset(level: LevelRef) -> Option<u64> {
    resolve(level).map(|slot| slot + save::TIME_FIELD)
}

pub fn boss_counter_offset(world: u8) -> Option<u64> {
    save::BOSS_COUNTERS
        .get(world.checked_sub(1)? as usize)
        .copied()
}
