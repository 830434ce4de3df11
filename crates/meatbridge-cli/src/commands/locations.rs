use anyhow::{Result, bail};
use meatbridge_core::game::locations::{is_known_location, known_locations, location_name};

pub fn run(id: Option<i64>) -> Result<()> {
    match id {
        Some(id) => {
            if !is_known_location(id) {
                bail!("Unknown location {}", id);
            }
            println!("{}  {}", id, location_name(id));
        }
        None => {
            for id in known_locations() {
                println!("{}  {}", id, location_name(id));
            }
        }
    }
    Ok(())
}
