pub mod collectibles;
pub mod items;
pub mod levels;
pub mod locations;
mod region;
mod state;

pub use items::{ItemEffect, ItemId, item_effect, item_name};
pub use levels::{is_a_plus, level_count, level_label, par_time, world_name};
pub use locations::{LocationId, location_name};
pub use region::{LevelRef, Region};
pub use state::{GameStateSnapshot, Screen};
