//! Bandages, warp zones and character warps

use std::collections::HashMap;
use std::sync::LazyLock;

use super::locations::{BASE_ID, LocationId};
use super::region::{LevelRef, Region};

/// Worlds with bandages, warp zones and character warps
pub const COLLECTIBLE_WORLDS: std::ops::RangeInclusive<u8> = 1..=5;

/// Zero-based light levels holding a bandage, per world 1-5
const LIGHT_BANDAGE_LEVELS: [[u8; 7]; 5] = [
    [3, 6, 8, 10, 12, 17, 19],
    [1, 4, 9, 12, 15, 17, 19],
    [0, 1, 3, 9, 10, 17, 19],
    [1, 5, 8, 12, 15, 16, 19],
    [2, 4, 8, 11, 15, 17, 19],
];

const DARK_BANDAGE_LEVELS: [[u8; 7]; 5] = [
    [2, 4, 9, 13, 14, 16, 18],
    [3, 5, 6, 9, 11, 14, 15],
    [2, 4, 5, 6, 13, 15, 18],
    [2, 3, 7, 9, 13, 17, 18],
    [3, 4, 7, 9, 10, 16, 17],
];

/// Zero-based warp slots holding a bandage
const WARP_BANDAGE_SLOTS: [[u8; 6]; 5] = [
    [0, 1, 7, 8, 10, 11],
    [0, 2, 6, 7, 9, 11],
    [0, 2, 6, 8, 10, 11],
    [1, 2, 7, 8, 10, 11],
    [1, 2, 6, 8, 9, 10],
];

pub const ZONES_PER_WORLD: u8 = 4;
pub const SLOTS_PER_ZONE: u8 = 3;

/// Warp zone names in save-slot order (zone = slot / 3)
const WARP_ZONE_NAMES: [[&str; 4]; 5] = [
    ["Sky Pup", "The Commander!", "Hand Held Hack", "Space Boy"],
    ["The Blood Shed", "The Bootlicker!", "Castle Crushers", "1977"],
    ["Tunnel Vision", "The Jump Man!", "Cartridge Dump", "Kontra"],
    ["The Key Master", "The Fly Guy!", "Brimstone", "MMMMMM"],
    ["Skyscraper", "The Guy!", "Sunshine Island", "Meat Is Death"],
];

/// Host level whose portal leads into each zone, per world
static WARP_HOSTS: [[LevelRef; 4]; 5] = [
    [
        LevelRef::light(1, 4),
        LevelRef::light(1, 11),
        LevelRef::light(1, 18),
        LevelRef::dark(1, 12),
    ],
    [
        LevelRef::light(2, 14),
        LevelRef::light(2, 7),
        LevelRef::light(2, 11),
        LevelRef::dark(2, 4),
    ],
    [
        LevelRef::light(3, 6),
        LevelRef::light(3, 15),
        LevelRef::light(3, 4),
        LevelRef::dark(3, 7),
    ],
    [
        LevelRef::light(4, 7),
        LevelRef::light(4, 17),
        LevelRef::light(4, 13),
        LevelRef::dark(4, 6),
    ],
    [
        LevelRef::light(5, 0),
        LevelRef::light(5, 6),
        LevelRef::light(5, 11),
        LevelRef::dark(5, 19),
    ],
];

/// Character unlocked by clearing each world's character warp
const CHARACTER_NAMES: [&str; 5] = ["Commander Video", "Jill", "Ogmo", "Flywrench", "The Kid"];

/// Warp slots making up the character zone (zone 1) of every world
pub const CHARACTER_WARP_SLOTS: [u8; 3] = [3, 4, 5];

/// Bandage slot → bandage location, assigned light W1-5, dark W1-5, warp W1-5
static BANDAGES: LazyLock<Vec<(LevelRef, LocationId)>> = LazyLock::new(|| {
    let light = COLLECTIBLE_WORLDS.flat_map(|w| {
        LIGHT_BANDAGE_LEVELS[w as usize - 1]
            .iter()
            .map(move |&i| LevelRef::light(w, i))
    });
    let dark = COLLECTIBLE_WORLDS.flat_map(|w| {
        DARK_BANDAGE_LEVELS[w as usize - 1]
            .iter()
            .map(move |&i| LevelRef::dark(w, i))
    });
    let warp = COLLECTIBLE_WORLDS.flat_map(|w| {
        WARP_BANDAGE_SLOTS[w as usize - 1]
            .iter()
            .map(move |&s| LevelRef::warp(w, s))
    });
    light
        .chain(dark)
        .chain(warp)
        .enumerate()
        .map(|(n, level)| (level, BASE_ID + 201 + n as LocationId))
        .collect()
});

static BANDAGE_BY_SLOT: LazyLock<HashMap<LevelRef, LocationId>> =
    LazyLock::new(|| BANDAGES.iter().copied().collect());

/// Slots that receive granted bandages: light then dark levels without one, W1-5
static GRANT_TARGETS: LazyLock<Vec<LevelRef>> = LazyLock::new(|| {
    let mut targets = Vec::new();
    for (region, table) in [
        (Region::Light, &LIGHT_BANDAGE_LEVELS),
        (Region::Dark, &DARK_BANDAGE_LEVELS),
    ] {
        for world in COLLECTIBLE_WORLDS {
            let taken = &table[world as usize - 1];
            targets.extend(
                (0..20u8)
                    .filter(|i| !taken.contains(i))
                    .map(|i| LevelRef::new(world, i, region)),
            );
        }
    }
    targets
});

/// Every bandage slot with its location, in location order
pub fn bandage_slots() -> &'static [(LevelRef, LocationId)] {
    &BANDAGES
}

pub fn bandage_location(level: LevelRef) -> Option<LocationId> {
    BANDAGE_BY_SLOT.get(&level).copied()
}

pub fn is_bandage_slot(level: LevelRef) -> bool {
    BANDAGE_BY_SLOT.contains_key(&level)
}

pub fn bandage_count_total() -> usize {
    BANDAGES.len()
}

pub fn bandage_grant_targets() -> &'static [LevelRef] {
    &GRANT_TARGETS
}

pub fn warp_zone_name(world: u8, zone: u8) -> Option<&'static str> {
    if !COLLECTIBLE_WORLDS.contains(&world) {
        return None;
    }
    WARP_ZONE_NAMES[world as usize - 1]
        .get(zone as usize)
        .copied()
}

/// "Sky Pup 2" style label for a warp slot
pub fn warp_slot_label(world: u8, slot: u8) -> String {
    let zone = slot / SLOTS_PER_ZONE;
    let sub = slot % SLOTS_PER_ZONE + 1;
    match warp_zone_name(world, zone) {
        Some(name) => format!("{} {}", name, sub),
        None => format!("W{} Zone {} {}", world, zone, sub),
    }
}

/// Zone entered through the portal on `host`, if it is a warp host
pub fn warp_zone_for_host(host: LevelRef) -> Option<u8> {
    if !COLLECTIBLE_WORLDS.contains(&host.world) {
        return None;
    }
    WARP_HOSTS[host.world as usize - 1]
        .iter()
        .position(|h| *h == host)
        .map(|zone| zone as u8)
}

pub fn zone_slots(zone: u8) -> std::ops::Range<u8> {
    zone * SLOTS_PER_ZONE..(zone + 1) * SLOTS_PER_ZONE
}

pub fn character_name(world: u8) -> Option<&'static str> {
    COLLECTIBLE_WORLDS
        .contains(&world)
        .then(|| CHARACTER_NAMES[world as usize - 1])
}
