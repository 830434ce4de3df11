//! Item identifiers and their effects on the progression model

use serde::Serialize;

use super::locations::BASE_ID;

pub type ItemId = i64;

pub const BANDAGE: ItemId = BASE_ID + 5;
pub const ONE_UP: ItemId = BASE_ID + 6;

/// Character items: (item offset, bitmask bit, name)
const CHARACTER_ITEMS: [(i64, u8, &str); 23] = [
    (10, 2, "4Color Meat Boy"),
    (11, 3, "4Bit Meat Boy"),
    (12, 7, "Meat Ninja"),
    (13, 10, "Naija"),
    (14, 11, "Commander Video"),
    (15, 12, "Runman"),
    (16, 13, "Blob"),
    (17, 14, "Steve"),
    (18, 16, "Flywrench"),
    (19, 18, "Jill"),
    (20, 19, "Captain Viridian"),
    (21, 20, "Tofu Boy"),
    (22, 21, "Josef"),
    (23, 22, "The Kid"),
    (24, 23, "Headcrab"),
    (25, 24, "Ogmo"),
    (26, 25, "Potato Boy"),
    (27, 26, "MeatBoy and BandageGirl"),
    (28, 27, "Alien Hominid"),
    (29, 28, "Autorun MeatBoy"),
    (30, 29, "Tim"),
    (31, 5, "Brownie"),
    (32, 6, "Bandage Girl"),
];

const BOSS_TOKEN_NAMES: [&str; 6] = [
    "Forest Boss Token",
    "Hospital Boss Token",
    "Salt Factory Boss Token",
    "Hell Boss Token",
    "Rapture Boss Token",
    "The End Boss Token",
];

const DARK_ACCESS_NAMES: [&str; 5] = [
    "Forest Dark Access",
    "Hospital Dark Access",
    "Salt Factory Dark Access",
    "Hell Dark Access",
    "Rapture Dark Access",
];

/// What a received item does to the progression model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ItemEffect {
    GrantWorld(u8),
    GrantBandage,
    GrantCharacter { bit: u8 },
    GrantBossToken(u8),
    GrantDarkAccess(u8),
    Filler,
}

/// Decode an item id; `None` for ids outside the table
pub fn item_effect(id: ItemId) -> Option<ItemEffect> {
    let offset = id - BASE_ID;
    let effect = match offset {
        1..=4 => ItemEffect::GrantWorld(offset as u8 + 1),
        5 => ItemEffect::GrantBandage,
        6 => ItemEffect::Filler,
        7 => ItemEffect::GrantWorld(6),
        8 => ItemEffect::GrantWorld(7),
        10..=32 => {
            let (_, bit, _) = CHARACTER_ITEMS.iter().find(|(o, _, _)| *o == offset)?;
            ItemEffect::GrantCharacter { bit: *bit }
        }
        33..=38 => ItemEffect::GrantBossToken((offset - 32) as u8),
        100..=104 => ItemEffect::GrantDarkAccess((offset - 99) as u8),
        _ => return None,
    };
    Some(effect)
}

pub fn item_name(id: ItemId) -> String {
    let offset = id - BASE_ID;
    let name = match item_effect(id) {
        Some(ItemEffect::GrantWorld(w)) => Some(format!("World {} Access", w)),
        Some(ItemEffect::GrantBandage) => Some("Bandage".to_string()),
        Some(ItemEffect::Filler) => Some("1-Up".to_string()),
        Some(ItemEffect::GrantCharacter { .. }) => CHARACTER_ITEMS
            .iter()
            .find(|(o, _, _)| *o == offset)
            .map(|(_, _, name)| name.to_string()),
        Some(ItemEffect::GrantBossToken(w)) => {
            Some(BOSS_TOKEN_NAMES[w as usize - 1].to_string())
        }
        Some(ItemEffect::GrantDarkAccess(w)) => {
            Some(DARK_ACCESS_NAMES[w as usize - 1].to_string())
        }
        None => None,
    };
    name.unwrap_or_else(|| format!("Unknown Item {}", id))
}

/// Name of the character behind a bitmask bit, if any item grants it
pub fn character_for_bit(bit: u8) -> Option<&'static str> {
    CHARACTER_ITEMS
        .iter()
        .find(|(_, b, _)| *b == bit)
        .map(|(_, _, name)| *name)
}
