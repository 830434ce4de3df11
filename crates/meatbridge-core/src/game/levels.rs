//! Level names and par times
//!
//! Tables are indexed `[world - 1][region][index]` with regions ordered light, dark,
//! warp. Worlds 6 and 7 carry no warp levels; world 6 has five light and five dark
//! levels.

use super::region::{LevelRef, Region};

pub const WORLD_COUNT: u8 = 7;

pub const WORLD_NAMES: [&str; 7] = [
    "The Forest",
    "The Hospital",
    "The Salt Factory",
    "Hell",
    "Rapture",
    "The End",
    "Cotton Alley",
];

const LEVEL_NAMES: [[&[&str]; 3]; 7] = [
    // 1 - The Forest
    [
        &[
            "Hello World", "Upward", "The Gap", "Nutshell", "Holy Mountain", "Bladecatcher",
            "Diverge", "The Bit", "Safety Third", "The Levee", "Fired", "Revolve",
            "Tommy's Cabin", "Blood Mountain", "Cactus Jumper", "Sidewinder", "MorningStar",
            "Altamont", "Intermission", "The Test",
        ],
        &[
            "oh, hello", "Onward", "BZZZZZ", "Plum Rain", "Creamsoda", "I am the night",
            "Two Roads", "Big Red", "So close", "Walls", "Doused", "Fireal", "Tommy's Condo",
            "Mystery Spot", "Kick Machine", "Night Game", "The Clock", "Whitewash",
            "The Queener", "A perfect end",
        ],
        &[
            "Sky Pup", "Sky Pup", "Sky Pup", "The Commander!", "The Commander!",
            "The Commander!", "Hand Held Hack", "Hand Held Hack", "Hand Held Hack",
            "Space boy", "Space boy", "Space boy",
        ],
    ],
    // 2 - The Hospital
    [
        &[
            "Biohazard", "One Down", "Memories", "Blew", "Big Empty", "The Grain", "Hush",
            "The Sabbath", "Blood Swamp", "johnny's cage", "Ghost Key", "Above", "Ulcer pop",
            "Aunt Flo", "Gallbladder", "Synj", "Worm food", "destructoid", "six feet",
            "Day Breaker",
        ],
        &[
            "back track", "pinkeye falls", "Buzzzzcut", "Blown", "Agent Orange", "Cher noble",
            "The Moon", "Grape Soda", "Centipede", "The Kracken", "Spineless", "Grey Matter",
            "Dust Bunnies", "Crawl Space", "Insurance?", "P.S.Y.", "Nels Box", "electrolysis",
            "Tenebrae", "Solemnity",
        ],
        &[
            "The Blood Shed", "The Blood Shed", "The Blood Shed", "The Bootlicker!",
            "The Bootlicker!", "The Bootlicker!", "Castle Crushers", "Castle Crushers",
            "Castle Crushers", "1977", "1977", "1977",
        ],
    ],
    // 3 - The Salt Factory
    [
        &[
            "Pit Stop", "The Salt Lick", "Push", "Transmissions", "Uptown", "The Shaft",
            "Mind the Gap", "Boomtown", "Shotzie!", "Breakdown", "Box Tripper", "The Dumper",
            "The Bend", "Gurdy", "Vertigo", "Mono", "Rustic", "The Grundle", "Dig",
            "White Noise",
        ],
        &[
            "Step one", "Salt + Wound", "The Red Room", "Assemble", "Wasp", "Not You Again",
            "Pluck", "Salt Crown", "Goliath", "Exploder", "The Salt Man", "Hellevator",
            "Black Circle", "Salmon", "Vertebreaker", "The Chaser", "Ashes", "Bile Duct",
            "El Topo", "Sweet Pea",
        ],
        &[
            "Tunnel Vision", "Tunnel Vision", "Tunnel Vision", "The Jump Man!",
            "The Jump Man!", "The Jump Man!", "Cartridge Dump", "Cartridge Dump",
            "Cartridge Dump", "Kontra", "Kontra", "Kontra",
        ],
    ],
    // 4 - Hell
    [
        &[
            "Boilermaker", "Brindle", "Heck Hole", "Hex", "Pyro", "Leviathan", "Rickets",
            "Weibe", "Deceiver", "Ball n Chain", "Oracle", "Big Brother", "Lazy", "Adversary",
            "Abaddon", "Bow", "Lost Highway", "Boris", "The Hive", "Babylon",
        ],
        &[
            "Gretel", "Golgotha", "Char", "Altered", "Wicked One", "The Gnashing", "Thistle",
            "Billy Boy", "Glut", "Gallow", "Surrender", "Beholder", "Oblivion", "Old Scratch",
            "Bone Yard", "Starless", "Invocation", "Sag Chamber", "Long Goodbye", "Imperial",
        ],
        &[
            "The Key Master", "The Key Master", "The Key Master", "The Fly Guy!",
            "The Fly Guy!", "The Fly Guy!", "Brimstone", "Brimstone", "Brimstone", "mmmmmm",
            "mmmmmm", "mmmmmm",
        ],
    ],
    // 5 - Rapture
    [
        &[
            "the witness", "evangel", "Ripe Decay", "Rise", "Panic Switch", "Left Behind",
            "The Fallen", "Descent", "Abomination", "Grinding Mill", "Heretic", "10 Horns",
            "The Lamb", "King Carrion", "The Flood", "Rotgut", "The Kingdom", "Gate of Ludd",
            "Wrath", "Judgment",
        ],
        &[
            "The Clot", "Loomer", "Spank", "Alabaster", "Nix", "Ripcord", "Downpthe", "Downer",
            "Swine", "Pulp Factory", "Blight", "Canker", "Halo of Flies", "Necrosis", "Choke",
            "Coil", "Millenium", "Stain", "Magog", "Quietus",
        ],
        &[
            "Skyscraper", "Skyscraper", "Skyscraper", "The Guy!", "The Guy!", "The Guy!",
            "Sunshine Island", "Sunshine Island", "Sunshine Island", "Meat is Death",
            "Meat is Death", "Meat is Death",
        ],
    ],
    // 6 - The End
    [
        &[
            "The Pit", "Schism", "Echoes", "Gently", "Omega",
        ],
        &[
            "Detox", "Ghost Tomb", "From Beyond", "Maze of Ith", "No Quarter",
        ],
        &[],
    ],
    // 7 - Cotton Alley
    [
        &[
            "Pink Noise", "Run Rabbit Run", "Spinal Tap", "Stag", "Tommunism", "Panic Attack",
            "Tunnel Blower", "Pig Latin", "Hatch", "Bullet Bob", "Train Eater", "Peel",
            "Pepto", "Watchtower", "Lock out", "hopscotch", "lead sheets", "Oobs revenge",
            "The Rash", "4 letter word",
        ],
        &[
            "White  Noise", "Flipside", "Organ Grinder", "The Tower", "Waiting Room",
            "Bone Machine", "Going up", "In Line", "Salt Shaker", "MasterBlaster", "Thumb",
            "Pink", "bleach", "20/20", "Patience", "Curls", "bullet proof", "They Bite",
            "XOXO", "Brag rights",
        ],
        &[],
    ],
];

const PAR_TIMES: [[&[f32]; 3]; 7] = [
    // 1 - The Forest
    [
        &[
            3.0, 5.0, 9.0, 9.0, 11.0, 7.0, 5.0, 4.5, 8.0, 7.5, 8.0, 7.0, 7.0, 8.0, 10.0, 9.0,
            9.0, 4.0, 20.0, 22.0,
        ],
        &[
            3.0, 4.5, 10.0, 12.0, 10.0, 7.0, 5.0, 6.0, 11.0, 11.0, 13.0, 12.0, 12.0, 14.0,
            18.0, 17.0, 12.0, 5.0, 17.0, 25.0,
        ],
        &[
            5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0,
        ],
    ],
    // 2 - The Hospital
    [
        &[
            11.0, 10.5, 14.0, 9.5, 16.0, 15.0, 19.0, 25.0, 11.0, 12.0, 9.0, 11.0, 10.0, 16.0,
            19.0, 15.0, 14.0, 16.5, 14.0, 24.0,
        ],
        &[
            17.0, 14.0, 13.0, 14.0, 20.0, 19.0, 30.0, 33.0, 14.0, 13.0, 12.5, 22.5, 11.0, 31.0,
            32.0, 16.0, 12.0, 17.0, 26.0, 36.0,
        ],
        &[
            5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0,
        ],
    ],
    // 3 - The Salt Factory
    [
        &[
            9.5, 8.3, 16.0, 12.0, 12.2, 4.5, 12.4, 8.3, 12.5, 10.5, 9.0, 11.6, 15.8, 14.8,
            14.8, 14.8, 10.5, 17.0, 17.0, 20.0,
        ],
        &[
            23.0, 16.0, 16.5, 20.0, 28.0, 20.0, 15.5, 17.5, 21.0, 18.0, 24.0, 11.6, 40.0, 18.0,
            27.0, 24.0, 11.5, 17.0, 17.0, 25.5,
        ],
        &[
            5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0,
        ],
    ],
    // 4 - Hell
    [
        &[
            11.0, 23.0, 11.5, 11.5, 12.0, 8.0, 17.0, 16.0, 6.0, 15.0, 12.5, 10.8, 11.5, 17.5,
            9.0, 12.0, 12.0, 24.5, 14.0, 22.0,
        ],
        &[
            19.0, 16.5, 12.0, 17.5, 14.0, 19.0, 18.0, 19.0, 10.5, 17.0, 16.5, 18.5, 23.0, 20.0,
            11.0, 11.5, 18.0, 29.0, 14.0, 31.0,
        ],
        &[
            5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0,
        ],
    ],
    // 5 - Rapture
    [
        &[
            22.0, 13.0, 18.0, 13.5, 12.5, 11.0, 23.0, 20.0, 19.5, 15.5, 18.5, 16.0, 20.0, 30.5,
            13.5, 30.0, 23.0, 17.0, 29.0, 32.0,
        ],
        &[
            30.0, 17.0, 35.0, 27.0, 18.0, 12.0, 15.0, 26.0, 40.0, 15.0, 25.0, 26.0, 25.0, 60.0,
            15.0, 32.0, 27.0, 19.0, 41.0, 48.0,
        ],
        &[
            5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0,
        ],
    ],
    // 6 - The End
    [
        &[
            30.0, 44.0, 34.0, 33.0, 44.0,
        ],
        &[
            40.0, 50.0, 70.0, 50.0, 60.0,
        ],
        &[],
    ],
    // 7 - Cotton Alley
    [
        &[
            11.0, 13.0, 23.0, 26.0, 30.0, 7.5, 10.5, 26.0, 21.0, 32.0, 18.0, 11.6, 22.0, 40.0,
            24.0, 20.0, 20.0, 21.0, 17.0, 45.0,
        ],
        &[
            60.0, 60.0, 60.0, 60.0, 60.0, 60.0, 60.0, 60.0, 60.0, 60.0, 60.0, 60.0, 60.0, 60.0,
            60.0, 60.5, 60.5, 60.0, 60.0, 60.0,
        ],
        &[],
    ],
];

fn region_column(region: Region) -> usize {
    match region {
        Region::Light => 0,
        Region::Dark => 1,
        Region::Warp => 2,
    }
}

pub fn world_name(world: u8) -> Option<&'static str> {
    world
        .checked_sub(1)
        .and_then(|i| WORLD_NAMES.get(i as usize))
        .copied()
}

/// Number of slots in a region of a world (0 when the region is absent)
pub fn level_count(world: u8, region: Region) -> u8 {
    match world.checked_sub(1) {
        Some(i) if (i as usize) < PAR_TIMES.len() => {
            PAR_TIMES[i as usize][region_column(region)].len() as u8
        }
        _ => 0,
    }
}

pub fn par_time(level: LevelRef) -> Option<f32> {
    let world = level.world.checked_sub(1)? as usize;
    PAR_TIMES
        .get(world)?
        .get(region_column(level.region))?
        .get(level.index as usize)
        .copied()
}

pub fn level_name(level: LevelRef) -> Option<&'static str> {
    let world = level.world.checked_sub(1)? as usize;
    LEVEL_NAMES
        .get(world)?
        .get(region_column(level.region))?
        .get(level.index as usize)
        .copied()
}

/// True when `time` earns an A+ on `level`
///
/// A non-positive time means the level was never finished and never qualifies.
pub fn is_a_plus(level: LevelRef, time: f32) -> bool {
    match par_time(level) {
        Some(par) => time > 0.0 && time <= par,
        None => false,
    }
}

/// Human readable label, e.g. "1-4 Nutshell", "2-4X Blown" or "Sky Pup 2"
pub fn level_label(level: LevelRef) -> String {
    if level.region.is_warp() {
        return super::collectibles::warp_slot_label(level.world, level.index);
    }
    let number = format!("{}-{}{}", level.world, level.index + 1, level.region.suffix());
    match level_name(level) {
        Some(name) => format!("{} {}", number, name),
        None => number,
    }
}
