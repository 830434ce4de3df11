//! Achievements derived from many slots at once
//!
//! An achievement is reported once and then never evaluated again.

use tracing::info;

use crate::game::collectibles::{COLLECTIBLE_WORLDS, ZONES_PER_WORLD, zone_slots};
use crate::game::levels::WORLD_COUNT;
use crate::game::locations::{
    BANDAGE_MILESTONES, GIRL_BOY, GOLDEN_GOD, LocationId, WARP_MILESTONES,
    bandage_milestone_location, dark_clear_location, location_name, warp_milestone_location,
    world_aplus_location, world_clear_location,
};
use crate::game::{LevelRef, Region, level_count};
use crate::process::{ReadMemory, WriteMemory};

use super::DetectContext;

pub fn check_aggregates<M: ReadMemory + WriteMemory>(ctx: &mut DetectContext<'_, M>) {
    if !ctx.options.achievement_locations {
        return;
    }

    for world in 1..=WORLD_COUNT {
        if unsettled(ctx, world_clear_location(world))
            && ctx.save.region_complete(world, Region::Light)
        {
            achieve(ctx, world_clear_location(world));
        }
        if unsettled(ctx, dark_clear_location(world))
            && ctx.save.region_complete(world, Region::Dark)
        {
            achieve(ctx, dark_clear_location(world));
        }
    }

    let bandages = ctx.model.bandage_count();
    for milestone in BANDAGE_MILESTONES.into_iter().filter(|m| bandages >= *m) {
        achieve(ctx, bandage_milestone_location(milestone));
    }

    let zones = completed_zones(ctx);
    for (n, (needed, _)) in WARP_MILESTONES.iter().enumerate() {
        if zones >= *needed {
            achieve(ctx, warp_milestone_location(n));
        }
    }

    if ctx.options.aplus_locations {
        for world in COLLECTIBLE_WORLDS {
            if unsettled(ctx, world_aplus_location(world))
                && all_graded(ctx, world, Region::Light)
            {
                achieve(ctx, world_aplus_location(world));
            }
        }
    }

    for (id, region) in [(GOLDEN_GOD, Region::Light), (GIRL_BOY, Region::Dark)] {
        let settled = ctx.outbox.contains(id)
            || (!ctx.options.aplus_locations && ctx.outbox.noted(id));
        if settled || !COLLECTIBLE_WORLDS.all(|w| all_graded(ctx, w, region)) {
            continue;
        }
        if ctx.outbox.note_once(id) {
            info!("Achievement: {}", location_name(id));
        }
        if ctx.options.aplus_locations {
            ctx.outbox.report(id);
        }
    }
}

fn unsettled<M>(ctx: &DetectContext<'_, M>, id: Option<LocationId>) -> bool {
    id.is_some_and(|id| !ctx.outbox.contains(id))
}

fn achieve<M>(ctx: &mut DetectContext<'_, M>, id: Option<LocationId>) {
    let Some(id) = id else {
        return;
    };
    if ctx.outbox.report(id) {
        info!("Achievement: {}", location_name(id));
    }
}

/// Warp zones of worlds 1-5 whose three slots are all complete
fn completed_zones<M: ReadMemory + WriteMemory>(ctx: &DetectContext<'_, M>) -> u32 {
    let mut zones = 0;
    for world in COLLECTIBLE_WORLDS {
        let slots = ctx.save.read_warp_slots(world);
        for zone in 0..ZONES_PER_WORLD {
            let done = zone_slots(zone).all(|slot| {
                slots[slot as usize].is_some_and(|r| r.is_complete())
            });
            if done {
                zones += 1;
            }
        }
    }
    zones
}

/// Every level of the region holds a qualifying A+ time
fn all_graded<M: ReadMemory + WriteMemory>(
    ctx: &DetectContext<'_, M>,
    world: u8,
    region: Region,
) -> bool {
    let count = level_count(world, region);
    count > 0
        && (0..count).all(|index| {
            let level = LevelRef::new(world, index, region);
            ctx.save
                .read_slot(level)
                .is_some_and(|record| ctx.graded_time(level, record).is_some())
        })
}
