use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::process::layout::level_type;

/// Save-data region of a world
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Region {
    Light,
    Dark,
    Warp,
}

impl Region {
    /// Map the game's level type code to a region
    pub fn from_level_type(code: i32) -> Option<Self> {
        match code {
            level_type::LIGHT => Some(Self::Light),
            level_type::DARK => Some(Self::Dark),
            level_type::WARP_MIN..=level_type::WARP_MAX => Some(Self::Warp),
            _ => None,
        }
    }

    /// Suffix used in level labels ("1-4X" for dark levels)
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Dark => "X",
            _ => "",
        }
    }

    pub fn is_warp(&self) -> bool {
        matches!(self, Self::Warp)
    }
}

/// Coordinates of one save slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LevelRef {
    pub world: u8,
    /// 0-based level index, or warp slot (0-11)
    pub index: u8,
    pub region: Region,
}

impl LevelRef {
    pub const fn new(world: u8, index: u8, region: Region) -> Self {
        Self {
            world,
            index,
            region,
        }
    }

    pub const fn light(world: u8, index: u8) -> Self {
        Self::new(world, index, Region::Light)
    }

    pub const fn dark(world: u8, index: u8) -> Self {
        Self::new(world, index, Region::Dark)
    }

    pub const fn warp(world: u8, slot: u8) -> Self {
        Self::new(world, slot, Region::Warp)
    }
}
