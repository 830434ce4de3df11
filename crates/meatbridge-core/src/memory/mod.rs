//! Memory access façade
//!
//! Wraps the raw [`ReadMemory`]/[`WriteMemory`] primitives so that no memory
//! failure ever escapes as an error: reads become `None`, writes become a logged
//! `false`.

pub mod address;
mod save;

pub use save::{SaveData, SlotRecord};

use tracing::debug;

use crate::game::GameStateSnapshot;
use crate::process::layout::state;
use crate::process::{ReadMemory, WriteMemory};

pub struct GameMemory<'a, M> {
    memory: &'a M,
}

impl<'a, M: ReadMemory> GameMemory<'a, M> {
    pub fn new(memory: &'a M) -> Self {
        Self { memory }
    }

    pub fn read_u8(&self, address: u64) -> Option<u8> {
        self.memory.read_u8(address).ok()
    }

    pub fn read_i32(&self, address: u64) -> Option<i32> {
        self.memory.read_i32(address).ok()
    }

    pub fn read_u32(&self, address: u64) -> Option<u32> {
        self.memory.read_u32(address).ok()
    }

    pub fn read_f32(&self, address: u64) -> Option<f32> {
        self.memory.read_f32(address).ok()
    }

    fn module(&self, offset: u64) -> u64 {
        self.memory.base_address() + offset
    }

    /// Follow a module-relative 32-bit pointer, then add `field`
    fn deref(&self, pointer: u64, field: u64) -> Option<u64> {
        match self.read_u32(self.module(pointer))? {
            0 => None,
            p => Some(p as u64 + field),
        }
    }

    /// Address of the save block, `None` while the game has not loaded one
    pub fn save_base(&self) -> Option<u64> {
        match self.read_u32(self.module(state::SAVE_PTR))? {
            0 => None,
            p => Some(p as u64),
        }
    }

    pub fn save_data(&self) -> Option<SaveData<'a, M>> {
        self.save_base().map(|base| SaveData::new(self.memory, base))
    }

    /// Read the live game state
    ///
    /// `None` when either the play flag or the world byte is unreadable. The
    /// pointer-chained fields degrade individually: the level becomes `None`,
    /// level type and UI state become -1.
    pub fn read_state(&self) -> Option<GameStateSnapshot> {
        let playing = self.read_u8(self.module(state::PLAYING))?;
        let world = self.read_u8(self.module(state::WORLD))?;
        let level = self
            .deref(state::LEVEL_PTR, state::LEVEL_OFFSET)
            .and_then(|a| self.read_u8(a));
        let level_type = self
            .deref(state::LEVEL_TYPE_PTR, state::LEVEL_TYPE_OFFSET)
            .and_then(|a| self.read_i32(a))
            .unwrap_or(-1);
        let ui_state = self
            .deref(state::UI_STATE_PTR, state::UI_STATE_OFFSET)
            .and_then(|a| self.read_i32(a))
            .unwrap_or(-1);
        let beaten = self.read_u8(self.module(state::LEVEL_BEATEN)).unwrap_or(0);
        let transition = self.read_u8(self.module(state::TRANSITION)).unwrap_or(0);

        Some(GameStateSnapshot {
            playing: playing == 1,
            world,
            level,
            beaten: beaten == 1,
            level_type,
            ui_state,
            transition,
        })
    }
}

impl<M: ReadMemory + WriteMemory> GameMemory<'_, M> {
    pub fn write_u8(&self, address: u64, value: u8) -> bool {
        contain(address, self.memory.write_u8(address, value))
    }

    pub fn write_u32(&self, address: u64, value: u32) -> bool {
        contain(address, self.memory.write_u32(address, value))
    }

    pub fn write_f32(&self, address: u64, value: f32) -> bool {
        contain(address, self.memory.write_f32(address, value))
    }
}

fn contain(address: u64, result: crate::Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!("Write to 0x{:X} failed: {}", address, e);
            false
        }
    }
}
