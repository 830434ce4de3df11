//! Full scans of the save block

use tracing::info;

use crate::game::collectibles::{
    CHARACTER_WARP_SLOTS, COLLECTIBLE_WORLDS, ZONES_PER_WORLD, character_name, warp_zone_name,
    zone_slots,
};
use crate::game::levels::WORLD_COUNT;
use crate::game::locations::{character_location, warp_completion_location};
use crate::game::{LevelRef, Region, level_count};
use crate::process::{ReadMemory, WriteMemory};

use super::{DetectContext, aggregate};

/// Scan every light and dark slot of `world`, plus its warp slots
///
/// Reports completions, bandages and grades the other paths may have missed.
pub fn sweep_world<M: ReadMemory + WriteMemory>(ctx: &mut DetectContext<'_, M>, world: u8) {
    for region in [Region::Light, Region::Dark] {
        for index in 0..level_count(world, region) {
            let level = LevelRef::new(world, index, region);
            let Some(record) = ctx.save.read_slot(level) else {
                continue;
            };
            if record.is_complete() {
                ctx.report_completion(level);
            }
            if record.has_bandage() {
                ctx.credit_bandage(level, record);
            }
            ctx.check_grade(level, record);
        }
    }

    if COLLECTIBLE_WORLDS.contains(&world) {
        for (slot, record) in ctx.save.read_warp_slots(world).into_iter().enumerate() {
            let Some(record) = record else {
                continue;
            };
            let level = LevelRef::warp(world, slot as u8);
            if record.has_bandage() {
                ctx.credit_bandage(level, record);
            }
            ctx.check_grade(level, record);
        }
        warp_progress(ctx, world);
    }

    aggregate::check_aggregates(ctx);
}

/// Sweep every world; used for the initial sync
pub fn sweep_all<M: ReadMemory + WriteMemory>(ctx: &mut DetectContext<'_, M>) {
    for world in 1..=WORLD_COUNT {
        sweep_world(ctx, world);
    }
}

/// Character warp and warp zone completions of `world`
pub fn warp_progress<M: ReadMemory + WriteMemory>(ctx: &mut DetectContext<'_, M>, world: u8) {
    let slots = ctx.save.read_warp_slots(world);
    let complete = |slot: u8| {
        slots
            .get(slot as usize)
            .copied()
            .flatten()
            .is_some_and(|r| r.is_complete())
    };

    if CHARACTER_WARP_SLOTS.iter().all(|&s| complete(s))
        && let Some(id) = character_location(world)
    {
        if ctx.outbox.note_once(id) {
            info!("Unlocked {}", character_name(world).unwrap_or("character"));
        }
        if ctx.options.character_warp_locations {
            ctx.outbox.report(id);
        }
    }

    for zone in 0..ZONES_PER_WORLD {
        if !zone_slots(zone).all(complete) {
            continue;
        }
        let Some(id) = warp_completion_location(world, zone) else {
            continue;
        };
        if ctx.outbox.note_once(id) {
            info!(
                "Cleared warp zone {}",
                warp_zone_name(world, zone).unwrap_or("?")
            );
        }
        if ctx.options.warp_completion_locations {
            ctx.outbox.report(id);
        }
    }
}
