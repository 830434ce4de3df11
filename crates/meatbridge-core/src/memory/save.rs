use serde::Serialize;
use tracing::debug;

use crate::game::{LevelRef, Region, level_count};
use crate::memory::address;
use crate::process::layout::{flags, save};
use crate::process::{ReadMemory, WriteMemory};

/// One save slot as stored by the game
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlotRecord {
    pub completion: u8,
    pub best_time: f32,
}

impl SlotRecord {
    pub fn is_complete(&self) -> bool {
        self.completion & flags::COMPLETE != 0
    }

    pub fn has_bandage(&self) -> bool {
        self.completion & flags::BANDAGE != 0
    }

    pub fn warp_found(&self) -> bool {
        self.completion & flags::WARP_FOUND != 0
    }
}

/// Typed access to the save block
///
/// Reads return `None` on any failure. Writes are best-effort: a failed write is
/// logged at debug level and reported as `false`, never as an error.
#[derive(Debug)]
pub struct SaveData<'a, M> {
    memory: &'a M,
    base: u64,
}

impl<M> Clone for SaveData<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M> Copy for SaveData<'_, M> {}

impl<'a, M: ReadMemory> SaveData<'a, M> {
    /// Wrap a save block located at `base`
    pub fn new(memory: &'a M, base: u64) -> Self {
        Self { memory, base }
    }

    pub fn base(&self) -> u64 {
        self.base
    }

    pub fn read_completion(&self, level: LevelRef) -> Option<u8> {
        let offset = address::completion_offset(level)?;
        self.memory.read_u8(self.base + offset).ok()
    }

    pub fn read_time(&self, level: LevelRef) -> Option<f32> {
        let offset = address::time_offset(level)?;
        self.memory.read_f32(self.base + offset).ok()
    }

    pub fn read_slot(&self, level: LevelRef) -> Option<SlotRecord> {
        Some(SlotRecord {
            completion: self.read_completion(level)?,
            best_time: self.read_time(level)?,
        })
    }

    pub fn is_complete(&self, level: LevelRef) -> bool {
        self.read_completion(level)
            .is_some_and(|c| c & flags::COMPLETE != 0)
    }

    /// All twelve warp slots of a world; unreadable slots are `None`
    pub fn read_warp_slots(&self, world: u8) -> [Option<SlotRecord>; save::WARP_SLOTS] {
        std::array::from_fn(|slot| self.read_slot(LevelRef::warp(world, slot as u8)))
    }

    /// True when every slot of the region is readable and complete
    pub fn region_complete(&self, world: u8, region: Region) -> bool {
        let count = level_count(world, region);
        count > 0 && (0..count).all(|i| self.is_complete(LevelRef::new(world, i, region)))
    }

    pub fn world_unlock(&self) -> Option<u8> {
        self.memory.read_u8(self.base + save::WORLD_UNLOCK).ok()
    }

    pub fn character_bits(&self) -> Option<u32> {
        self.memory.read_u32(self.base + save::CHARACTER_BITMASK).ok()
    }

    pub fn boss_counter(&self, world: u8) -> Option<u8> {
        let offset = address::boss_counter_offset(world)?;
        self.memory.read_u8(self.base + offset).ok()
    }
}

impl<M: ReadMemory + WriteMemory> SaveData<'_, M> {
    pub fn write_completion(&self, level: LevelRef, value: u8) -> bool {
        match address::completion_offset(level) {
            Some(offset) => self.write_u8(offset, value),
            None => {
                debug!("No completion slot for {:?}", level);
                false
            }
        }
    }

    pub fn write_time(&self, level: LevelRef, value: f32) -> bool {
        match address::time_offset(level) {
            Some(offset) => self.write_f32(offset, value),
            None => {
                debug!("No time slot for {:?}", level);
                false
            }
        }
    }

    pub fn set_world_unlock(&self, mask: u8) -> bool {
        self.write_u8(save::WORLD_UNLOCK, mask)
    }

    pub fn set_character_bits(&self, bits: u32) -> bool {
        self.write_u32(save::CHARACTER_BITMASK, bits)
    }

    pub fn set_boss_counter(&self, world: u8, value: u8) -> bool {
        match address::boss_counter_offset(world) {
            Some(offset) => self.write_u8(offset, value),
            None => false,
        }
    }

    fn write_u8(&self, offset: u64, value: u8) -> bool {
        self.log_write(offset, self.memory.write_u8(self.base + offset, value))
    }

    fn write_u32(&self, offset: u64, value: u32) -> bool {
        self.log_write(offset, self.memory.write_u32(self.base + offset, value))
    }

    fn write_f32(&self, offset: u64, value: f32) -> bool {
        self.log_write(offset, self.memory.write_f32(self.base + offset, value))
    }

    fn log_write(&self, offset: u64, result: crate::Result<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                debug!("Save write at +0x{:X} failed: {}", offset, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::{MockMemory, MockMemoryBuilder};

    const SAVE_BASE: u64 = 0x1000;

    fn save_image() -> MockMemory {
        MockMemoryBuilder::new()
            .base(SAVE_BASE)
            .with_size(save::WORLD_UNLOCK as usize + 4)
            .build()
    }

    #[test]
    fn test_read_slot() {
        let memory = save_image();
        let level = LevelRef::light(1, 3);
        let slot = address::resolve(level).unwrap() as usize;
        memory.poke_f32(slot, 8.5);
        memory.poke_u8(slot + 4, flags::COMPLETE | flags::BANDAGE);

        let save = SaveData::new(&memory, SAVE_BASE);
        let record = save.read_slot(level).unwrap();
        assert_eq!(record.best_time, 8.5);
        assert!(record.is_complete());
        assert!(record.has_bandage());
        assert!(!record.warp_found());
    }

    #[test]
    fn test_invalid_level_reads_none() {
        let memory = save_image();
        let save = SaveData::new(&memory, SAVE_BASE);
        assert_eq!(save.read_completion(LevelRef::warp(6, 0)), None);
        assert_eq!(save.read_time(LevelRef::light(1, 20)), None);
        assert!(!save.write_completion(LevelRef::dark(6, 5), 2));
    }

    #[test]
    fn test_out_of_bounds_reads_none() {
        let memory = MockMemory::new(vec![0; 16]);
        let save = SaveData::new(&memory, SAVE_BASE);
        assert_eq!(save.read_slot(LevelRef::light(2, 0)), None);
        assert_eq!(save.character_bits(), None);
    }

    #[test]
    fn test_region_complete() {
        let memory = save_image();
        let save = SaveData::new(&memory, SAVE_BASE);
        for i in 0..5 {
            save.write_completion(LevelRef::light(6, i), flags::COMPLETE);
        }
        assert!(save.region_complete(6, Region::Light));
        assert!(!save.region_complete(6, Region::Dark));
        assert!(!save.region_complete(6, Region::Warp));
    }

    #[test]
    fn test_gating_fields() {
        let memory = save_image();
        let save = SaveData::new(&memory, SAVE_BASE);
        assert!(save.set_world_unlock(0b101));
        assert!(save.set_character_bits(0x41));
        assert!(save.set_boss_counter(6, 5));
        assert_eq!(save.world_unlock(), Some(0b101));
        assert_eq!(save.character_bits(), Some(0x41));
        assert_eq!(save.boss_counter(6), Some(5));
        assert!(!save.set_boss_counter(7, 1));
    }

    #[test]
    fn test_failed_write_is_contained() {
        let memory = save_image();
        memory.set_fail_writes(true);
        let save = SaveData::new(&memory, SAVE_BASE);
        assert!(!save.write_time(LevelRef::light(1, 0), 3.0));
        assert_eq!(save.read_time(LevelRef::light(1, 0)), Some(0.0));
    }

    #[test]
    fn test_warp_slots() {
        let memory = save_image();
        let save = SaveData::new(&memory, SAVE_BASE);
        save.write_completion(LevelRef::warp(2, 4), flags::COMPLETE);
        let slots = save.read_warp_slots(2);
        assert!(slots[4].unwrap().is_complete());
        assert!(!slots[3].unwrap().is_complete());
        assert!(save.read_warp_slots(6).iter().all(Option::is_none));
    }
}
