//! Status command implementation.

use anyhow::{Context, Result};
use meatbridge_core::game::levels::WORLD_COUNT;
use meatbridge_core::game::{LevelRef, Region, Screen, is_a_plus, level_count, world_name};
use meatbridge_core::memory::SaveData;
use meatbridge_core::process::layout::save;
use meatbridge_core::process::ProcessMemory;
use meatbridge_core::{GameMemory, GameStateSnapshot, ReadMemory};
use owo_colors::OwoColorize;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StatusReport {
    pid: u32,
    screen: Screen,
    state: GameStateSnapshot,
    save: Option<SaveSummary>,
}

#[derive(Debug, PartialEq, Serialize)]
struct SaveSummary {
    world_mask: Option<u8>,
    character_bits: Option<u32>,
    boss_counters: Vec<Option<u8>>,
    worlds: Vec<WorldSummary>,
}

#[derive(Debug, PartialEq, Serialize)]
struct WorldSummary {
    world: u8,
    name: &'static str,
    completed: u32,
    levels: u32,
    bandages: u32,
    a_plus: u32,
}

pub fn run(pid: Option<u32>, json: bool) -> Result<()> {
    let process = super::open_process(pid)?;
    let memory = ProcessMemory::new(&process);
    let game = GameMemory::new(&memory);

    let state = game
        .read_state()
        .context("Game state is not readable; is a save loaded?")?;
    let report = StatusReport {
        pid: process.pid,
        screen: state.screen(),
        state,
        save: game.save_data().map(summarize),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    Ok(())
}

fn summarize<M: ReadMemory>(save: SaveData<'_, M>) -> SaveSummary {
    let worlds = (1..=WORLD_COUNT)
        .map(|world| {
            let mut summary = WorldSummary {
                world,
                name: world_name(world).unwrap_or("?"),
                completed: 0,
                levels: 0,
                bandages: 0,
                a_plus: 0,
            };
            for region in [Region::Light, Region::Dark, Region::Warp] {
                for index in 0..level_count(world, region) {
                    let level = LevelRef::new(world, index, region);
                    let Some(record) = save.read_slot(level) else {
                        continue;
                    };
                    if !region.is_warp() {
                        summary.levels += 1;
                        summary.completed += record.is_complete() as u32;
                    }
                    summary.bandages += record.has_bandage() as u32;
                    summary.a_plus +=
                        (record.is_complete() && is_a_plus(level, record.best_time)) as u32;
                }
            }
            summary
        })
        .collect();

    SaveSummary {
        world_mask: save.world_unlock(),
        character_bits: save.character_bits(),
        boss_counters: (1..=save::BOSS_COUNTERS.len() as u8)
            .map(|world| save.boss_counter(world))
            .collect(),
        worlds,
    }
}

fn print_report(report: &StatusReport) {
    println!("PID {}: {}", report.pid, report.screen.bold());
    let state = &report.state;
    println!(
        "  world {}  level {}  playing {}  beaten {}  type {}  ui {}",
        state.world,
        state
            .level
            .map_or_else(|| "-".to_string(), |l| l.to_string()),
        state.playing,
        state.beaten,
        state.level_type,
        state.ui_state
    );

    let Some(save) = &report.save else {
        println!("{}", "No save file loaded".yellow());
        return;
    };

    let hex = |v: Option<u32>| v.map_or_else(|| "?".to_string(), |v| format!("{:#x}", v));
    println!(
        "World mask {}  characters {}",
        hex(save.world_mask.map(u32::from)),
        hex(save.character_bits)
    );
    let counters: Vec<String> = save
        .boss_counters
        .iter()
        .map(|c| c.map_or_else(|| "?".to_string(), |c| c.to_string()))
        .collect();
    println!("Boss counters {}", counters.join(" "));

    println!();
    println!(
        "{:<3} {:<14} {:>9} {:>9} {:>5}",
        "W", "Name", "Complete", "Bandages", "A+"
    );
    for world in &save.worlds {
        let done = format!("{}/{}", world.completed, world.levels);
        let done = if world.levels > 0 && world.completed == world.levels {
            done.green().to_string()
        } else {
            done
        };
        println!(
            "{:<3} {:<14} {:>9} {:>9} {:>5}",
            world.world, world.name, done, world.bandages, world.a_plus
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meatbridge_core::memory::address::{completion_offset, time_offset};
    use meatbridge_core::process::MockMemoryBuilder;
    use meatbridge_core::process::layout::flags;

    #[test]
    fn test_summarize_counts_slots() {
        let light = LevelRef::light(1, 3);
        let dark = LevelRef::dark(1, 2);
        let memory = MockMemoryBuilder::new()
            .base(0)
            .with_size(save::WORLD_UNLOCK as usize + 4)
            .write_u8(save::WORLD_UNLOCK as usize, 0b11)
            .write_u8(completion_offset(light).unwrap() as usize, flags::COMPLETE)
            .write_f32(time_offset(light).unwrap() as usize, 8.5)
            .write_u8(
                completion_offset(dark).unwrap() as usize,
                flags::COMPLETE | flags::BANDAGE,
            )
            .write_f32(time_offset(dark).unwrap() as usize, 99.0)
            .build();

        let summary = summarize(SaveData::new(&memory, 0));
        assert_eq!(summary.world_mask, Some(0b11));
        assert_eq!(summary.boss_counters.len(), 6);

        let forest = &summary.worlds[0];
        assert_eq!(forest.completed, 2);
        assert_eq!(forest.levels, 40);
        assert_eq!(forest.bandages, 1);
        assert_eq!(forest.a_plus, 1);
        assert_eq!(summary.worlds[1].completed, 0);
    }
}
