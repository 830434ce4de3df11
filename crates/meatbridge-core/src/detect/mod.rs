//! Event detection
//!
//! Three independent paths find the same events:
//! - inline: the level changes while play continues
//! - exit: play ends, the slot is diffed against the entry snapshot
//! - sweep: every slot of a world is scanned from the selection screens
//!
//! All of them report through the [`Outbox`], which drops duplicates, so the
//! order in which they fire does not matter.

pub mod aggregate;
mod boss;
pub mod sweep;

pub use boss::{BossDefeat, PendingBoss};

use std::collections::HashMap;
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::{BridgeConfig, SlotOptions};
use crate::game::collectibles::{
    bandage_location, is_bandage_slot, warp_zone_for_host, warp_zone_name,
};
use crate::game::locations::{aplus_location, completion_location};
use crate::game::{GameStateSnapshot, LevelRef, Region, is_a_plus, level_label};
use crate::memory::{SaveData, SlotRecord};
use crate::process::layout::{flags, save};
use crate::process::{ReadMemory, WriteMemory};
use crate::progress::{Outbox, ProgressionModel};

/// Whether completing `level` is a location in this seed
pub fn completion_reportable(level: LevelRef, options: &SlotOptions) -> bool {
    match (level.world, level.region) {
        (_, Region::Warp) => false,
        (7, _) => options.w7_locations,
        (1..=6, Region::Light) => true,
        (1..=6, Region::Dark) => options.dark_world_levels,
        _ => false,
    }
}

/// State shared by every detection path during one cycle
pub struct DetectContext<'a, M> {
    pub save: SaveData<'a, M>,
    pub model: &'a ProgressionModel,
    pub options: &'a SlotOptions,
    pub outbox: &'a mut Outbox,
}

impl<M: ReadMemory + WriteMemory> DetectContext<'_, M> {
    /// Log a completed level once and report it when it is a location
    pub fn report_completion(&mut self, level: LevelRef) {
        let Some(id) = completion_location(level) else {
            debug!("No completion location for {:?}", level);
            return;
        };
        if self.outbox.note_once(id) {
            info!("Completed {}", level_label(level));
        }
        if completion_reportable(level, self.options) {
            self.outbox.report(id);
        }
    }

    /// Report the bandage at `level` and clear its bit
    ///
    /// Returns `false` when `level` is not a bandage slot; its bit is then left
    /// alone.
    pub fn credit_bandage(&mut self, level: LevelRef, record: SlotRecord) -> bool {
        let Some(id) = bandage_location(level) else {
            return false;
        };
        if self.outbox.report(id) {
            info!("Bandage found in {}", level_label(level));
        }
        self.save
            .write_completion(level, record.completion & !flags::BANDAGE);
        true
    }

    /// Best time that earns an A+, or `None` when the slot does not qualify
    ///
    /// Light levels carrying a time written by the bridge never qualify. A real
    /// time hidden by the dark lock stands in for the suppressed one.
    pub fn graded_time(&self, level: LevelRef, record: SlotRecord) -> Option<f32> {
        if !record.is_complete() {
            return None;
        }
        let light = level.region == Region::Light;
        if light && self.model.is_synthetic(level) {
            return None;
        }
        let time = match self.model.real_time(level) {
            Some(real) if light && is_a_plus(level, real) => real,
            _ => record.best_time,
        };
        is_a_plus(level, time).then_some(time)
    }

    pub fn check_grade(&mut self, level: LevelRef, record: SlotRecord) {
        let Some(id) = aplus_location(level) else {
            return;
        };
        let Some(time) = self.graded_time(level, record) else {
            return;
        };
        if self.outbox.note_once(id) {
            info!("A+ on {} ({:.3}s)", level_label(level), time);
        }
        if self.options.aplus_locations {
            self.outbox.report(id);
        }
    }
}

type WarpSnapshot = [Option<SlotRecord>; save::WARP_SLOTS];

/// Edge detection between consecutive snapshots
#[derive(Debug, Default)]
pub struct Detector {
    entries: HashMap<LevelRef, SlotRecord>,
    warp_entries: HashMap<u8, WarpSnapshot>,
    pending_boss: Option<PendingBoss>,
}

/// What happened during one call to [`Detector::observe`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Observed {
    /// Play ended this cycle, in the given world
    pub exited: Option<u8>,
}

impl Detector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all snapshots and any pending boss, e.g. after losing the process
    pub fn reset(&mut self) {
        self.entries.clear();
        self.warp_entries.clear();
        self.pending_boss = None;
    }

    pub fn pending_boss(&self) -> Option<&PendingBoss> {
        self.pending_boss.as_ref()
    }

    pub fn has_entry(&self, level: LevelRef) -> bool {
        self.entries.contains_key(&level)
    }

    pub fn has_warp_entry(&self, world: u8) -> bool {
        self.warp_entries.contains_key(&world)
    }

    /// Compare two consecutive snapshots and report what changed
    pub fn observe<M: ReadMemory + WriteMemory>(
        &mut self,
        prev: &GameStateSnapshot,
        cur: &GameStateSnapshot,
        ctx: &mut DetectContext<'_, M>,
        config: &BridgeConfig,
        now: Instant,
    ) -> Observed {
        let mut observed = Observed::default();

        if cur.playing && cur.in_warp() && cur.valid_world() {
            self.snapshot_warp(cur.world, ctx);
        }

        match (prev.playing, cur.playing) {
            (false, true) => self.snapshot_entry(cur, ctx),
            (true, true) => {
                if !prev.beaten
                    && cur.beaten
                    && let Some(level) = cur.level_ref().filter(|l| l.region == Region::Light)
                {
                    ctx.report_completion(level);
                }
                let moved = prev.level != cur.level || prev.world != cur.world;
                if moved && prev.actual_level().is_some() {
                    self.inline_transition(prev, cur, ctx, config);
                }
            }
            (true, false) => {
                self.exit(prev, ctx, config, now);
                observed.exited = Some(prev.world);
            }
            (false, false) => {}
        }

        observed
    }

    /// Settle a pending boss, returning it once confirmed
    pub fn settle_boss(
        &mut self,
        cur: &GameStateSnapshot,
        config: &BridgeConfig,
        now: Instant,
    ) -> Option<BossDefeat> {
        let pending = self.pending_boss?;
        let elapsed = now.saturating_duration_since(pending.observed_at);

        if elapsed > config.boss_settle && pending.confirmed_by(cur) {
            self.pending_boss = None;
            return Some(pending.defeat());
        }
        if elapsed > config.boss_timeout {
            debug!(
                "Discarding unconfirmed boss in world {} after {:?}",
                pending.world, elapsed
            );
            self.pending_boss = None;
        }
        None
    }

    fn snapshot_warp<M: ReadMemory>(&mut self, world: u8, ctx: &DetectContext<'_, M>) {
        if self.warp_entries.contains_key(&world) {
            return;
        }
        let slots = ctx.save.read_warp_slots(world);
        if slots.iter().any(Option::is_some) {
            debug!("Warp snapshot for world {}", world);
            self.warp_entries.insert(world, slots);
        }
    }

    fn snapshot_entry<M: ReadMemory>(
        &mut self,
        cur: &GameStateSnapshot,
        ctx: &DetectContext<'_, M>,
    ) {
        if cur.actual_level().is_none() || !cur.valid_world() {
            return;
        }
        if cur.in_warp() {
            self.snapshot_warp(cur.world, ctx);
        } else if let Some(level) = cur.level_ref() {
            match ctx.save.read_slot(level) {
                Some(record) => {
                    self.entries.insert(level, record);
                }
                None => debug!("No entry snapshot for {:?}", level),
            }
        }
    }

    fn inline_transition<M: ReadMemory + WriteMemory>(
        &mut self,
        prev: &GameStateSnapshot,
        cur: &GameStateSnapshot,
        ctx: &mut DetectContext<'_, M>,
        config: &BridgeConfig,
    ) {
        thread::sleep(config.settle_delay);

        if self.warp_entries.contains_key(&prev.world) {
            self.diff_warp(prev.world, ctx);
        } else if let Some(level) = prev.level_ref() {
            self.diff_level(level, ctx);
        }
        self.snapshot_entry(cur, ctx);
    }

    fn exit<M: ReadMemory + WriteMemory>(
        &mut self,
        prev: &GameStateSnapshot,
        ctx: &mut DetectContext<'_, M>,
        config: &BridgeConfig,
        now: Instant,
    ) {
        thread::sleep(config.settle_delay);

        if prev.is_boss_or_map() && prev.valid_world() {
            let dark = prev.world == 6 && prev.region() == Some(Region::Dark);
            debug!("Left boss level in world {} (dark: {})", prev.world, dark);
            self.pending_boss = Some(PendingBoss::new(prev.world, dark, now));
        }

        if self.warp_entries.contains_key(&prev.world) {
            self.diff_warp(prev.world, ctx);
            sweep::warp_progress(ctx, prev.world);
            self.warp_entries.remove(&prev.world);
        } else if let Some(level) = prev.level_ref() {
            self.diff_level(level, ctx);
        }

        aggregate::check_aggregates(ctx);
        if prev.valid_world() {
            sweep::sweep_world(ctx, prev.world);
        }
    }

    /// Diff a light or dark slot against its entry snapshot, consuming it
    fn diff_level<M: ReadMemory + WriteMemory>(
        &mut self,
        level: LevelRef,
        ctx: &mut DetectContext<'_, M>,
    ) {
        let entry = self.entries.remove(&level);
        let Some(now) = ctx.save.read_slot(level) else {
            debug!("Could not read {:?} after play", level);
            return;
        };

        match entry {
            Some(entry) => {
                if !entry.is_complete() && now.is_complete() {
                    ctx.report_completion(level);
                }
                if !entry.warp_found() && now.warp_found() {
                    let zone = warp_zone_for_host(level)
                        .and_then(|zone| warp_zone_name(level.world, zone));
                    if let Some(name) = zone {
                        info!("Found warp zone {}", name);
                    }
                }
                if now.has_bandage() && !entry.has_bandage() && !is_bandage_slot(level) {
                    debug!("Bandage bit on {} has no location", level_label(level));
                }
            }
            None => debug!(
                "No entry snapshot for {}, leaving it to the sweep",
                level_label(level)
            ),
        }

        if now.has_bandage() {
            ctx.credit_bandage(level, now);
        }
        ctx.check_grade(level, now);
    }

    /// Diff the warp slots of `world` against the snapshot taken on entry
    fn diff_warp<M: ReadMemory + WriteMemory>(
        &mut self,
        world: u8,
        ctx: &mut DetectContext<'_, M>,
    ) {
        let Some(entry) = self.warp_entries.get(&world).copied() else {
            return;
        };
        let now = ctx.save.read_warp_slots(world);

        for (slot, (before, after)) in entry.iter().zip(now.iter()).enumerate() {
            let (Some(before), Some(after)) = (before, after) else {
                continue;
            };
            let level = LevelRef::warp(world, slot as u8);
            if after.has_bandage() {
                ctx.credit_bandage(level, *after);
            }
            if !before.is_complete() && after.is_complete() {
                info!("Cleared {}", level_label(level));
            }
            if ctx.graded_time(level, *before).is_none() {
                ctx.check_grade(level, *after);
            }
        }

        // The next diff of this visit starts from here
        self.warp_entries
            .insert(world, ctx.save.read_warp_slots(world));
    }
}
