//! End-to-end bridge cycles against a fabricated game image

use std::sync::atomic::AtomicBool;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use meatbridge_core::config::{BossTokenMode, GoalMode};
use meatbridge_core::game::collectibles::bandage_location;
use meatbridge_core::game::items::BANDAGE;
use meatbridge_core::game::locations::{
    BASE_ID, LocationId, aplus_location, boss_location, completion_location,
};
use meatbridge_core::game::par_time;
use meatbridge_core::memory::address::{completion_offset, time_offset};
use meatbridge_core::process::layout::{flags, save, state};
use meatbridge_core::process::{MockMemory, MockMemoryBuilder};
use meatbridge_core::{
    Bridge, BridgeConfig, GoalState, LevelRef, LocationSink, Result, ServerEvent, SessionEnd,
    SlotOptions,
};

const LEVEL_BLOCK: usize = 0x31_0000;
const TYPE_BLOCK: usize = 0x31_8000;
const SAVE_BLOCK: usize = 0x32_0000;

#[derive(Default)]
struct RecordingSink {
    sent: Vec<LocationId>,
    goals: usize,
}

impl RecordingSink {
    fn count(&self, id: LocationId) -> usize {
        self.sent.iter().filter(|s| **s == id).count()
    }
}

impl LocationSink for RecordingSink {
    fn send_location_checks(&mut self, ids: &[LocationId]) -> Result<()> {
        self.sent.extend_from_slice(ids);
        Ok(())
    }

    fn send_goal_complete(&mut self) -> Result<()> {
        self.goals += 1;
        Ok(())
    }
}

fn game() -> MockMemory {
    MockMemoryBuilder::new()
        .base(0)
        .with_size(SAVE_BLOCK + 0x3960)
        .write_u32(state::LEVEL_PTR as usize, LEVEL_BLOCK as u32)
        .write_u32(state::LEVEL_TYPE_PTR as usize, TYPE_BLOCK as u32)
        .write_u32(state::SAVE_PTR as usize, SAVE_BLOCK as u32)
        .write_u8(state::WORLD as usize, 1)
        .write_u8(SAVE_BLOCK + save::WORLD_UNLOCK as usize, 1)
        .write_u32(SAVE_BLOCK + save::CHARACTER_BITMASK as usize, 1)
        .build()
}

fn config() -> BridgeConfig {
    BridgeConfig::builder()
        .settle_delay(Duration::ZERO)
        .boss_settle(Duration::from_millis(100))
        .boss_timeout(Duration::from_secs(5))
        .enforce_interval(Duration::ZERO)
        .sweep_interval(Duration::ZERO)
        .build()
}

fn connect(bridge: &mut Bridge, options: SlotOptions, checked: Vec<LocationId>) {
    bridge
        .handle_event(ServerEvent::Connected {
            checked_locations: checked,
            options,
        })
        .unwrap();
}

fn receive(bridge: &mut Bridge, index: u64, item: i64) {
    bridge
        .handle_event(ServerEvent::ReceivedItem {
            index,
            item,
            player: 1,
        })
        .unwrap();
}

/// Point the game at a screen: playing flag, world, level byte, level type, UI state
fn screen(memory: &MockMemory, playing: bool, world: u8, level: u8, level_type: i32, ui: i32) {
    memory.poke_u8(state::PLAYING as usize, playing as u8);
    memory.poke_u8(state::WORLD as usize, world);
    memory.poke_u8(LEVEL_BLOCK + state::LEVEL_OFFSET as usize, level);
    memory.poke_i32(TYPE_BLOCK + state::LEVEL_TYPE_OFFSET as usize, level_type);
    memory.poke_i32(LEVEL_BLOCK + state::UI_STATE_OFFSET as usize, ui);
}

fn level_select(memory: &MockMemory, world: u8) {
    screen(memory, false, world, 0, 0, state::UI_LEVEL_SELECT);
}

fn set_slot(memory: &MockMemory, level: LevelRef, completion: u8, time: f32) {
    memory.poke_u8(SAVE_BLOCK + completion_offset(level).unwrap() as usize, completion);
    memory.poke_f32(SAVE_BLOCK + time_offset(level).unwrap() as usize, time);
}

fn completion_byte(memory: &MockMemory, level: LevelRef) -> u8 {
    memory.peek_u8(SAVE_BLOCK + completion_offset(level).unwrap() as usize)
}

fn slot_time(memory: &MockMemory, level: LevelRef) -> f32 {
    memory.peek_f32(SAVE_BLOCK + time_offset(level).unwrap() as usize)
}

#[test]
fn test_aplus_reported_once_across_sweeps() {
    let memory = game();
    let level = LevelRef::light(1, 3);
    set_slot(&memory, level, flags::COMPLETE, 8.5);
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    let options = SlotOptions {
        aplus_locations: true,
        ..Default::default()
    };
    connect(&mut bridge, options, vec![]);

    let mut sink = RecordingSink::default();
    let start = Instant::now();
    for i in 0..3 {
        bridge.poll(&memory, start + Duration::from_millis(i * 100));
        bridge.flush(&mut sink).unwrap();
    }

    assert_eq!(sink.count(aplus_location(level).unwrap()), 1);
    assert_eq!(sink.count(completion_location(level).unwrap()), 1);
}

#[test]
fn test_dark_bandage_reported_and_cleared() {
    let memory = game();
    let level = LevelRef::dark(2, 3);
    set_slot(&memory, level, flags::COMPLETE | flags::BANDAGE, 20.0);
    level_select(&memory, 2);

    let mut bridge = Bridge::new(config());
    connect(&mut bridge, SlotOptions::default(), vec![]);

    let mut sink = RecordingSink::default();
    bridge.poll(&memory, Instant::now());
    bridge.flush(&mut sink).unwrap();

    assert_eq!(bandage_location(level), Some(BASE_ID + 243));
    assert_eq!(sink.count(BASE_ID + 243), 1);
    assert_eq!(completion_byte(&memory, level), flags::COMPLETE);
    // Dark completions are not locations unless enabled
    assert_eq!(sink.count(completion_location(level).unwrap()), 0);
}

#[test]
fn test_boss_gate_opens_at_token_cost() {
    let memory = game();
    let counter = SAVE_BLOCK + save::BOSS_COUNTERS[0] as usize;
    memory.poke_u8(counter, 12);
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    let options = SlotOptions {
        boss_token_mode: BossTokenMode::Tokens,
        boss_tokens_w1: 3,
        ..Default::default()
    };
    connect(&mut bridge, options, vec![]);
    let start = Instant::now();

    // World 1 boss token is item offset 33
    receive(&mut bridge, 0, BASE_ID + 33);
    receive(&mut bridge, 1, BASE_ID + 33);
    bridge.poll(&memory, start);
    assert_eq!(memory.peek_u8(counter), 0);

    // The game recounting its own progress does not reopen the door
    memory.poke_u8(counter, 17);
    bridge.poll(&memory, start + Duration::from_millis(10));
    assert_eq!(memory.peek_u8(counter), 0);

    receive(&mut bridge, 2, BASE_ID + 33);
    bridge.poll(&memory, start + Duration::from_millis(20));
    assert_eq!(memory.peek_u8(counter), save::BOSS_THRESHOLDS[0]);
    assert!(bridge.model().boss_unlocked(1));
}

#[test]
fn test_boss_kill_reports_location_and_goal() {
    let memory = game();
    let mut bridge = Bridge::new(config());
    let options = SlotOptions {
        goal: GoalMode::BeatRaptureBoss,
        bandages_required: 2,
        ..Default::default()
    };
    connect(&mut bridge, options, vec![]);
    receive(&mut bridge, 0, BANDAGE);

    let mut sink = RecordingSink::default();
    let start = Instant::now();
    let kill = |bridge: &mut Bridge, sink: &mut RecordingSink, at: Instant| {
        screen(&memory, true, 5, state::MAP_OR_BOSS_LEVEL, 0, 0);
        bridge.poll(&memory, at);
        screen(&memory, false, 5, state::MAP_OR_BOSS_LEVEL, 0, 0);
        bridge.poll(&memory, at + Duration::from_millis(10));
        screen(&memory, false, 5, state::MAP_OR_BOSS_LEVEL, 0, state::UI_WORLD_MAP);
        bridge.poll(&memory, at + Duration::from_millis(500));
        bridge.flush(sink).unwrap();
    };

    kill(&mut bridge, &mut sink, start);
    assert_eq!(sink.count(boss_location(5).unwrap()), 1);
    assert_eq!(sink.goals, 0);
    assert_eq!(bridge.goal_state(), GoalState::InProgress);

    receive(&mut bridge, 1, BANDAGE);
    kill(&mut bridge, &mut sink, start + Duration::from_secs(1));
    assert_eq!(sink.count(boss_location(5).unwrap()), 1);
    assert_eq!(sink.goals, 1);
    assert_eq!(bridge.goal_state(), GoalState::Completed);
}

#[test]
fn test_all_bosses_goal_survives_restart() {
    let memory = game();
    let mut bridge = Bridge::new(config());
    let options = SlotOptions {
        goal: GoalMode::BeatAllBosses,
        ..Default::default()
    };
    // Worlds 1-4 were beaten in an earlier run
    let checked = (1..=4).filter_map(boss_location).collect();
    connect(&mut bridge, options, checked);
    assert_eq!(bridge.goal_state(), GoalState::InProgress);

    let mut sink = RecordingSink::default();
    let start = Instant::now();
    screen(&memory, true, 5, state::MAP_OR_BOSS_LEVEL, 0, 0);
    bridge.poll(&memory, start);
    screen(&memory, false, 5, state::MAP_OR_BOSS_LEVEL, 0, 0);
    bridge.poll(&memory, start + Duration::from_millis(10));
    screen(&memory, false, 5, state::MAP_OR_BOSS_LEVEL, 0, state::UI_WORLD_MAP);
    bridge.poll(&memory, start + Duration::from_millis(500));
    bridge.flush(&mut sink).unwrap();

    assert_eq!(sink.count(boss_location(5).unwrap()), 1);
    assert_eq!(sink.goals, 1);
    assert_eq!(bridge.goal_state(), GoalState::Completed);
}

#[test]
fn test_exit_and_sweeps_report_once() {
    let memory = game();
    let level = LevelRef::light(1, 3);
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    connect(&mut bridge, SlotOptions::default(), vec![]);

    let mut sink = RecordingSink::default();
    let start = Instant::now();
    bridge.poll(&memory, start);
    screen(&memory, true, 1, 3, 0, 0);
    bridge.poll(&memory, start + Duration::from_millis(10));

    set_slot(&memory, level, flags::COMPLETE | flags::BANDAGE, 30.0);
    level_select(&memory, 1);
    for i in 0..3 {
        bridge.poll(&memory, start + Duration::from_millis(20 + i * 10));
        bridge.flush(&mut sink).unwrap();
    }

    assert_eq!(sink.count(completion_location(level).unwrap()), 1);
    assert_eq!(sink.count(bandage_location(level).unwrap()), 1);
    assert_eq!(sink.sent.len(), 2);
    assert_eq!(completion_byte(&memory, level), flags::COMPLETE);
}

#[test]
fn test_inline_and_sweep_report_once() {
    let memory = game();
    let first = LevelRef::light(1, 5);
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    connect(&mut bridge, SlotOptions::default(), vec![]);

    let mut sink = RecordingSink::default();
    let start = Instant::now();
    bridge.poll(&memory, start);
    screen(&memory, true, 1, 5, 0, 0);
    bridge.poll(&memory, start + Duration::from_millis(10));

    // Straight into the next level without leaving play
    set_slot(&memory, first, flags::COMPLETE, 20.0);
    screen(&memory, true, 1, 6, 0, 0);
    bridge.poll(&memory, start + Duration::from_millis(20));
    bridge.flush(&mut sink).unwrap();
    assert_eq!(sink.count(completion_location(first).unwrap()), 1);

    level_select(&memory, 1);
    for i in 0..2 {
        bridge.poll(&memory, start + Duration::from_millis(30 + i * 10));
        bridge.flush(&mut sink).unwrap();
    }
    assert_eq!(sink.count(completion_location(first).unwrap()), 1);
    assert_eq!(sink.sent.len(), 1);
}

#[test]
fn test_unconfirmed_boss_is_discarded() {
    let memory = game();
    let mut bridge = Bridge::new(config());
    connect(&mut bridge, SlotOptions::default(), vec![]);

    let start = Instant::now();
    screen(&memory, true, 2, state::MAP_OR_BOSS_LEVEL, 0, 0);
    bridge.poll(&memory, start);
    // Died and went back to level select instead of the world map
    level_select(&memory, 2);
    bridge.poll(&memory, start + Duration::from_millis(10));
    bridge.poll(&memory, start + Duration::from_secs(6));

    let mut sink = RecordingSink::default();
    bridge.flush(&mut sink).unwrap();
    assert_eq!(sink.count(boss_location(2).unwrap()), 0);
}

#[test]
fn test_synthetic_times_never_grade() {
    let memory = game();
    let level = LevelRef::light(1, 0);
    let par = par_time(level).unwrap();
    set_slot(&memory, level, flags::COMPLETE, par + 10.0);
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    let options = SlotOptions {
        aplus_locations: true,
        dark_lock_mode: true,
        ..Default::default()
    };
    connect(&mut bridge, options, vec![]);
    // World 1 dark access
    receive(&mut bridge, 0, BASE_ID + 100);

    let mut sink = RecordingSink::default();
    let start = Instant::now();
    for i in 0..3 {
        bridge.poll(&memory, start + Duration::from_millis(i * 10));
        bridge.flush(&mut sink).unwrap();
    }

    assert!(slot_time(&memory, level) < par);
    assert!(bridge.model().is_synthetic(level));
    assert_eq!(sink.count(aplus_location(level).unwrap()), 0);
    assert_eq!(sink.count(completion_location(level).unwrap()), 1);
}

#[test]
fn test_leftover_written_time_never_grades() {
    let memory = game();
    let level = LevelRef::light(1, 0);
    let par = par_time(level).unwrap();
    // Written by an earlier run of the bridge
    set_slot(&memory, level, flags::COMPLETE, par - 0.001);
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    let options = SlotOptions {
        aplus_locations: true,
        dark_lock_mode: true,
        ..Default::default()
    };
    connect(&mut bridge, options, vec![]);
    receive(&mut bridge, 0, BASE_ID + 100);

    let mut sink = RecordingSink::default();
    bridge.poll(&memory, Instant::now());
    bridge.flush(&mut sink).unwrap();

    assert!(bridge.model().is_synthetic(level));
    assert_eq!(sink.count(aplus_location(level).unwrap()), 0);
    assert_eq!(sink.count(completion_location(level).unwrap()), 1);
}

#[test]
fn test_dark_lock_hides_and_restores_real_time() {
    let memory = game();
    let level = LevelRef::light(1, 4);
    let par = par_time(level).unwrap();
    let real = par - 1.0;
    set_slot(&memory, level, flags::COMPLETE, real);
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    let options = SlotOptions {
        aplus_locations: true,
        dark_lock_mode: true,
        ..Default::default()
    };
    connect(&mut bridge, options, vec![]);

    let mut sink = RecordingSink::default();
    let start = Instant::now();
    bridge.poll(&memory, start);
    bridge.flush(&mut sink).unwrap();

    // Locked: the game no longer sees an A+, but the grade still counts
    assert!(slot_time(&memory, level) > par);
    assert_eq!(sink.count(aplus_location(level).unwrap()), 1);

    // One access item opens the first five levels at 4 items per world
    receive(&mut bridge, 0, BASE_ID + 100);
    bridge.poll(&memory, start + Duration::from_millis(10));
    assert_eq!(slot_time(&memory, level), real);
    assert!(!bridge.model().is_synthetic(level));
}

#[test]
fn test_checked_locations_are_never_resent() {
    let memory = game();
    let level = LevelRef::light(1, 3);
    set_slot(&memory, level, flags::COMPLETE, 30.0);
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    let done = completion_location(level).unwrap();
    connect(&mut bridge, SlotOptions::default(), vec![done]);

    let mut sink = RecordingSink::default();
    bridge.poll(&memory, Instant::now());
    bridge.flush(&mut sink).unwrap();
    assert_eq!(sink.count(done), 0);

    let other = LevelRef::light(1, 1);
    set_slot(&memory, other, flags::COMPLETE, 30.0);
    bridge
        .handle_event(ServerEvent::LocationsChecked {
            ids: vec![completion_location(other).unwrap()],
        })
        .unwrap();
    bridge.poll(&memory, Instant::now());
    bridge.flush(&mut sink).unwrap();
    assert!(sink.sent.is_empty());
}

#[test]
fn test_granted_worlds_survive_game_writes() {
    let memory = game();
    let unlock = SAVE_BLOCK + save::WORLD_UNLOCK as usize;
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    connect(&mut bridge, SlotOptions::default(), vec![]);
    receive(&mut bridge, 0, BASE_ID + 1);

    let start = Instant::now();
    bridge.poll(&memory, start);
    assert_eq!(memory.peek_u8(unlock), 0b11);

    // The game opens world 3 on its own, then the bridge takes it back
    memory.poke_u8(unlock, 0b111);
    bridge.poll(&memory, start + Duration::from_millis(10));
    assert_eq!(memory.peek_u8(unlock), 0b11);

    // Replaying the item list on reconnect grants nothing new
    connect(&mut bridge, SlotOptions::default(), vec![]);
    receive(&mut bridge, 0, BASE_ID + 1);
    bridge.poll(&memory, start + Duration::from_millis(20));
    assert_eq!(memory.peek_u8(unlock), 0b11);
    assert_eq!(bridge.model().next_item_index(), 1);
}

#[test]
fn test_items_before_connect_wait_for_options() {
    let mut bridge = Bridge::new(config());
    receive(&mut bridge, 0, BASE_ID + 33);
    assert_eq!(bridge.model().boss_tokens(1), 0);

    let options = SlotOptions {
        boss_token_mode: BossTokenMode::Tokens,
        boss_tokens_w1: 1,
        ..Default::default()
    };
    connect(&mut bridge, options, vec![]);
    assert!(bridge.model().boss_unlocked(1));
}

#[test]
fn test_nothing_happens_before_connect() {
    let memory = game();
    let level = LevelRef::light(1, 3);
    set_slot(&memory, level, flags::COMPLETE, 8.5);
    level_select(&memory, 1);

    let mut bridge = Bridge::new(config());
    bridge.poll(&memory, Instant::now());
    assert!(bridge.outbox().pending().is_empty());
    assert_eq!(memory.peek_u8(SAVE_BLOCK + save::WORLD_UNLOCK as usize), 1);
}

#[test]
fn test_run_stops_on_shutdown() {
    let memory = game();
    let (_tx, rx) = mpsc::channel();
    let mut bridge = Bridge::new(config());
    let shutdown = AtomicBool::new(true);
    let end = bridge
        .run(&memory, &mut RecordingSink::default(), &rx, &shutdown)
        .unwrap();
    assert_eq!(end, SessionEnd::Shutdown);
}

#[test]
fn test_run_stops_when_process_exits() {
    let memory = game();
    memory.set_alive(false);
    let (_tx, rx) = mpsc::channel();
    let mut bridge = Bridge::new(config());
    let end = bridge
        .run(&memory, &mut RecordingSink::default(), &rx, &AtomicBool::new(false))
        .unwrap();
    assert_eq!(end, SessionEnd::ProcessLost);
}

#[test]
fn test_run_stops_when_session_closes() {
    let memory = game();
    let (tx, rx) = mpsc::channel();
    tx.send(ServerEvent::Connected {
        checked_locations: vec![],
        options: SlotOptions::default(),
    })
    .unwrap();
    drop(tx);

    let mut bridge = Bridge::new(config());
    let end = bridge
        .run(&memory, &mut RecordingSink::default(), &rx, &AtomicBool::new(false))
        .unwrap();
    assert_eq!(end, SessionEnd::SessionClosed);
    assert!(bridge.options().is_some());
}

#[test]
fn test_run_returns_refusal() {
    let memory = game();
    let (tx, rx) = mpsc::channel();
    tx.send(ServerEvent::ConnectionRefused {
        reasons: vec!["InvalidPassword".into()],
    })
    .unwrap();

    let mut bridge = Bridge::new(config());
    let err = bridge
        .run(&memory, &mut RecordingSink::default(), &rx, &AtomicBool::new(false))
        .unwrap_err();
    assert!(matches!(
        err,
        meatbridge_core::Error::ConnectionRefused(reasons) if reasons == ["InvalidPassword"]
    ));
}
