//! Location identifiers
//!
//! Every check the bridge reports is a fixed offset from [`BASE_ID`]. The
//! numbering is shared with the server-side world definition, so these tables
//! must never be renumbered.

use super::collectibles::{self, ZONES_PER_WORLD};
use super::levels::{self, world_name};
use super::region::{LevelRef, Region};

pub type LocationId = i64;

pub const BASE_ID: LocationId = 7_700_000;

pub const DARK_BOSS: LocationId = BASE_ID + 107;
pub const GOLDEN_GOD: LocationId = BASE_ID + 931;
pub const GIRL_BOY: LocationId = BASE_ID + 932;

pub const BANDAGE_MILESTONES: [u32; 10] = [10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// Completed warp zone counts that award a milestone, with their names
pub const WARP_MILESTONES: [(u32, &str); 4] = [
    (1, "Nostalgia"),
    (5, "Living in the Past"),
    (10, "Old School"),
    (20, "Retro Rampage"),
];

const WORLD_APLUS_NAMES: [&str; 5] = ["Rare", "Medium Rare", "Medium", "Medium Well", "Well Done"];

/// Highest offset in use
const LAST_OFFSET: LocationId = 941;

/// Completion location of a light or dark level
pub fn completion_location(level: LevelRef) -> Option<LocationId> {
    let i = level.index as LocationId;
    let w = level.world as LocationId;
    let offset = match (level.region, level.world) {
        (Region::Light, 1..=5) if i < 20 => (w - 1) * 20 + i + 1,
        (Region::Dark, 1..=5) if i < 20 => 300 + (w - 1) * 20 + i + 1,
        (Region::Light, 6) if i < 5 => 401 + i,
        (Region::Dark, 6) if i < 5 => 406 + i,
        (Region::Light, 7) if i < 20 => 811 + i,
        (Region::Dark, 7) if i < 20 => 831 + i,
        _ => return None,
    };
    Some(BASE_ID + offset)
}

/// A+ grade location of any level, warp slots included
pub fn aplus_location(level: LevelRef) -> Option<LocationId> {
    let i = level.index as LocationId;
    let w = level.world as LocationId;
    let offset = match (level.region, level.world) {
        (Region::Light, 1..=5) if i < 20 => 500 + (w - 1) * 20 + i + 1,
        (Region::Dark, 1..=5) if i < 20 => 600 + (w - 1) * 20 + i + 1,
        (Region::Light, 6) if i < 5 => 701 + i,
        (Region::Dark, 6) if i < 5 => 706 + i,
        (Region::Light, 7) if i < 20 => 711 + i,
        (Region::Dark, 7) if i < 20 => 731 + i,
        (Region::Warp, 1..=5) if i < 12 => 751 + (w - 1) * 12 + i,
        _ => return None,
    };
    Some(BASE_ID + offset)
}

pub fn boss_location(world: u8) -> Option<LocationId> {
    (1..=6)
        .contains(&world)
        .then(|| BASE_ID + 100 + world as LocationId)
}

pub fn character_location(world: u8) -> Option<LocationId> {
    collectibles::COLLECTIBLE_WORLDS
        .contains(&world)
        .then(|| BASE_ID + 850 + world as LocationId)
}

pub fn warp_completion_location(world: u8, zone: u8) -> Option<LocationId> {
    if !collectibles::COLLECTIBLE_WORLDS.contains(&world) || zone >= ZONES_PER_WORLD {
        return None;
    }
    Some(BASE_ID + 861 + (world as LocationId - 1) * 4 + zone as LocationId)
}

pub fn world_clear_location(world: u8) -> Option<LocationId> {
    match world {
        1..=5 => Some(BASE_ID + 900 + world as LocationId),
        6 => Some(BASE_ID + 911),
        7 => Some(BASE_ID + 913),
        _ => None,
    }
}

pub fn dark_clear_location(world: u8) -> Option<LocationId> {
    match world {
        1..=5 => Some(BASE_ID + 905 + world as LocationId),
        6 => Some(BASE_ID + 912),
        7 => Some(BASE_ID + 914),
        _ => None,
    }
}

pub fn bandage_milestone_location(count: u32) -> Option<LocationId> {
    BANDAGE_MILESTONES
        .contains(&count)
        .then(|| BASE_ID + 920 + (count / 10) as LocationId)
}

/// Location of the `n`th entry of [`WARP_MILESTONES`]
pub fn warp_milestone_location(n: usize) -> Option<LocationId> {
    (n < WARP_MILESTONES.len()).then(|| BASE_ID + 933 + n as LocationId)
}

/// Per-world "all light A+" achievement, worlds 1-5
pub fn world_aplus_location(world: u8) -> Option<LocationId> {
    collectibles::COLLECTIBLE_WORLDS
        .contains(&world)
        .then(|| BASE_ID + 936 + world as LocationId)
}

fn world_label(world: LocationId) -> String {
    u8::try_from(world)
        .ok()
        .and_then(world_name)
        .map(str::to_string)
        .unwrap_or_else(|| format!("W{}", world))
}

fn describe(offset: LocationId) -> Option<String> {
    let level_in_block = |start: LocationId| {
        let n = offset - start;
        ((n / 20 + 1) as u8, (n % 20) as u8)
    };
    let name = match offset {
        1..=100 => {
            let (w, i) = level_in_block(1);
            levels::level_label(LevelRef::light(w, i))
        }
        101..=106 => format!("Boss - {}", world_label(offset - 100)),
        107 => "Boss - The End (Dark)".to_string(),
        201..=300 => format!("Bandage #{}", offset - 200),
        301..=400 => {
            let (w, i) = level_in_block(301);
            levels::level_label(LevelRef::dark(w, i))
        }
        401..=405 => levels::level_label(LevelRef::light(6, (offset - 401) as u8)),
        406..=410 => levels::level_label(LevelRef::dark(6, (offset - 406) as u8)),
        501..=600 => {
            let (w, i) = level_in_block(501);
            format!("A+ {}", levels::level_label(LevelRef::light(w, i)))
        }
        601..=700 => {
            let (w, i) = level_in_block(601);
            format!("A+ {}", levels::level_label(LevelRef::dark(w, i)))
        }
        701..=705 => format!(
            "A+ {}",
            levels::level_label(LevelRef::light(6, (offset - 701) as u8))
        ),
        706..=710 => format!(
            "A+ {}",
            levels::level_label(LevelRef::dark(6, (offset - 706) as u8))
        ),
        711..=730 => format!(
            "A+ {}",
            levels::level_label(LevelRef::light(7, (offset - 711) as u8))
        ),
        731..=750 => format!(
            "A+ {}",
            levels::level_label(LevelRef::dark(7, (offset - 731) as u8))
        ),
        751..=810 => {
            let n = offset - 751;
            let world = (n / 12 + 1) as u8;
            let slot = (n % 12) as u8;
            format!("A+ {}", collectibles::warp_slot_label(world, slot))
        }
        811..=830 => levels::level_label(LevelRef::light(7, (offset - 811) as u8)),
        831..=850 => levels::level_label(LevelRef::dark(7, (offset - 831) as u8)),
        851..=855 => format!(
            "Character - {}",
            collectibles::character_name((offset - 850) as u8)?
        ),
        861..=880 => {
            let n = offset - 861;
            let world = (n / 4 + 1) as u8;
            let zone = (n % 4) as u8;
            format!(
                "Warp Complete - {}",
                collectibles::warp_zone_name(world, zone)?
            )
        }
        901..=905 => format!("World Clear - {}", world_label(offset - 900)),
        906..=910 => format!("Dark Clear - {}", world_label(offset - 905)),
        911 => "World Clear - The End".to_string(),
        912 => "Dark Clear - The End".to_string(),
        913 => "World Clear - Cotton Alley".to_string(),
        914 => "Dark Clear - Cotton Alley".to_string(),
        921..=930 => format!("Bandage Milestone - {}", (offset - 920) * 10),
        931 => "The Golden God (All Light A+)".to_string(),
        932 => "Girl Boy (All Dark A+)".to_string(),
        933..=936 => format!(
            "Warp Milestone - {}",
            WARP_MILESTONES[(offset - 933) as usize].1
        ),
        937..=941 => format!(
            "World A+ - {}",
            WORLD_APLUS_NAMES[(offset - 937) as usize]
        ),
        _ => return None,
    };
    Some(name)
}

/// Display name of a location, "Unknown Location N" when the id is not in use
pub fn location_name(id: LocationId) -> String {
    describe(id - BASE_ID).unwrap_or_else(|| format!("Unknown Location {}", id))
}

pub fn is_known_location(id: LocationId) -> bool {
    describe(id - BASE_ID).is_some()
}

/// Every location id in use, ascending
pub fn known_locations() -> impl Iterator<Item = LocationId> {
    (1..=LAST_OFFSET)
        .filter(|offset| describe(*offset).is_some())
        .map(|offset| BASE_ID + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_location_ranges() {
        assert_eq!(completion_location(LevelRef::light(1, 0)), Some(BASE_ID + 1));
        assert_eq!(completion_location(LevelRef::light(5, 19)), Some(BASE_ID + 100));
        assert_eq!(completion_location(LevelRef::dark(1, 0)), Some(BASE_ID + 301));
        assert_eq!(completion_location(LevelRef::light(6, 4)), Some(BASE_ID + 405));
        assert_eq!(completion_location(LevelRef::dark(6, 0)), Some(BASE_ID + 406));
        assert_eq!(completion_location(LevelRef::light(7, 0)), Some(BASE_ID + 811));
        assert_eq!(completion_location(LevelRef::dark(7, 19)), Some(BASE_ID + 850));
        assert_eq!(completion_location(LevelRef::light(6, 5)), None);
        assert_eq!(completion_location(LevelRef::warp(1, 0)), None);
    }

    #[test]
    fn test_aplus_location_ranges() {
        assert_eq!(aplus_location(LevelRef::light(1, 3)), Some(BASE_ID + 504));
        assert_eq!(aplus_location(LevelRef::dark(2, 3)), Some(BASE_ID + 624));
        assert_eq!(aplus_location(LevelRef::light(6, 0)), Some(BASE_ID + 701));
        assert_eq!(aplus_location(LevelRef::dark(7, 19)), Some(BASE_ID + 750));
        assert_eq!(aplus_location(LevelRef::warp(1, 0)), Some(BASE_ID + 751));
        assert_eq!(aplus_location(LevelRef::warp(5, 11)), Some(BASE_ID + 810));
        assert_eq!(aplus_location(LevelRef::warp(6, 0)), None);
        assert_eq!(aplus_location(LevelRef::warp(1, 12)), None);
    }

    #[test]
    fn test_aggregate_locations() {
        assert_eq!(boss_location(5), Some(BASE_ID + 105));
        assert_eq!(boss_location(7), None);
        assert_eq!(character_location(3), Some(BASE_ID + 853));
        assert_eq!(warp_completion_location(2, 3), Some(BASE_ID + 868));
        assert_eq!(warp_completion_location(2, 4), None);
        assert_eq!(world_clear_location(6), Some(BASE_ID + 911));
        assert_eq!(dark_clear_location(7), Some(BASE_ID + 914));
        assert_eq!(bandage_milestone_location(30), Some(BASE_ID + 923));
        assert_eq!(bandage_milestone_location(35), None);
        assert_eq!(warp_milestone_location(3), Some(BASE_ID + 936));
        assert_eq!(warp_milestone_location(4), None);
        assert_eq!(world_aplus_location(5), Some(BASE_ID + 941));
    }

    #[test]
    fn test_location_names() {
        assert_eq!(location_name(BASE_ID + 4), "1-4 Nutshell");
        assert_eq!(location_name(BASE_ID + 105), "Boss - Rapture");
        assert_eq!(location_name(DARK_BOSS), "Boss - The End (Dark)");
        assert_eq!(location_name(BASE_ID + 243), "Bandage #43");
        assert_eq!(location_name(BASE_ID + 624), "A+ 2-4X Blown");
        assert_eq!(location_name(BASE_ID + 752), "A+ Sky Pup 2");
        assert_eq!(location_name(BASE_ID + 852), "Character - Jill");
        assert_eq!(location_name(BASE_ID + 861), "Warp Complete - Sky Pup");
        assert_eq!(location_name(BASE_ID + 901), "World Clear - The Forest");
        assert_eq!(location_name(BASE_ID + 930), "Bandage Milestone - 100");
        assert_eq!(location_name(BASE_ID + 934), "Warp Milestone - Living in the Past");
        assert_eq!(location_name(BASE_ID + 938), "World A+ - Medium Rare");
        assert_eq!(location_name(BASE_ID + 150), "Unknown Location 7700150");
    }

    #[test]
    fn test_known_locations_count() {
        // 250 completions, 7 bosses, 100 bandages, 310 grades, 5 characters,
        // 20 warp zones, 14 clears, 10 + 4 milestones, 2 + 5 A+ achievements
        assert_eq!(known_locations().count(), 727);
        assert!(known_locations().all(is_known_location));
    }

    #[test]
    fn test_ids_round_trip_through_names() {
        for world in 1..=7 {
            for region in [Region::Light, Region::Dark] {
                for index in 0..levels::level_count(world, region) {
                    let level = LevelRef::new(world, index, region);
                    let id = completion_location(level).unwrap();
                    assert_eq!(location_name(id), levels::level_label(level));
                }
            }
        }
    }
}
