//! Mock process memory for testing
//!
//! Provides an in-memory implementation of `ReadMemory` and `WriteMemory` so the
//! detector and enforcement passes can run against a fabricated game image.

use std::cell::{Cell, RefCell};

use crate::error::{Error, Result};
use crate::process::{ProcessInfo, ReadMemory, WriteMemory};

/// Mock process memory for testing
///
/// Reads and writes go to a shared buffer starting at `base`. Writes use interior
/// mutability, mirroring how a real process handle is shared immutably.
#[derive(Debug)]
pub struct MockMemory {
    data: RefCell<Vec<u8>>,
    base: u64,
    alive: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MockMemory {
    /// Create a new mock with the given data at base address 0x1000
    pub fn new(data: Vec<u8>) -> Self {
        Self::with_base(data, 0x1000)
    }

    /// Create a new mock with custom base address
    pub fn with_base(data: Vec<u8>, base: u64) -> Self {
        Self {
            data: RefCell::new(data),
            base,
            alive: Cell::new(true),
            fail_writes: Cell::new(false),
        }
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }

    /// Simulate the process exiting
    pub fn set_alive(&self, alive: bool) {
        self.alive.set(alive);
    }

    /// Make every subsequent write fail, as a protected page would
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Poke a byte at an offset from base, bypassing `WriteMemory`
    ///
    /// Stands in for the game writing its own memory between polls.
    pub fn poke_u8(&self, offset: usize, value: u8) {
        self.poke(offset, &[value]);
    }

    pub fn poke_i32(&self, offset: usize, value: i32) {
        self.poke(offset, &value.to_le_bytes());
    }

    pub fn poke_u32(&self, offset: usize, value: u32) {
        self.poke(offset, &value.to_le_bytes());
    }

    pub fn poke_f32(&self, offset: usize, value: f32) {
        self.poke(offset, &value.to_le_bytes());
    }

    /// Read a byte at an offset from base; panics when out of range
    pub fn peek_u8(&self, offset: usize) -> u8 {
        self.data.borrow()[offset]
    }

    pub fn peek_u32(&self, offset: usize) -> u32 {
        let data = self.data.borrow();
        u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    }

    pub fn peek_f32(&self, offset: usize) -> f32 {
        f32::from_bits(self.peek_u32(offset))
    }

    fn poke(&self, offset: usize, bytes: &[u8]) {
        let mut data = self.data.borrow_mut();
        if data.len() < offset + bytes.len() {
            data.resize(offset + bytes.len(), 0);
        }
        data[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    fn range(&self, address: u64, size: usize) -> std::result::Result<usize, String> {
        if address < self.base {
            return Err(format!("Address below base (base=0x{:X})", self.base));
        }
        let offset = (address - self.base) as usize;
        let len = self.data.borrow().len();
        if offset + size > len {
            return Err(format!(
                "Out of bounds: offset={}, size={}, len={}",
                offset, size, len
            ));
        }
        Ok(offset)
    }
}

impl ReadMemory for MockMemory {
    fn read_bytes(&self, address: u64, size: usize) -> Result<Vec<u8>> {
        let offset = self
            .range(address, size)
            .map_err(|message| Error::MemoryReadFailed { address, message })?;
        Ok(self.data.borrow()[offset..offset + size].to_vec())
    }

    fn base_address(&self) -> u64 {
        self.base
    }
}

impl WriteMemory for MockMemory {
    fn write_bytes(&self, address: u64, bytes: &[u8]) -> Result<()> {
        if self.fail_writes.get() {
            return Err(Error::MemoryWriteFailed {
                address,
                message: "Write rejected by mock".to_string(),
            });
        }
        let offset = self
            .range(address, bytes.len())
            .map_err(|message| Error::MemoryWriteFailed { address, message })?;
        self.data.borrow_mut()[offset..offset + bytes.len()].copy_from_slice(bytes);
        Ok(())
    }
}

impl ProcessInfo for MockMemory {
    fn pid(&self) -> u32 {
        4242
    }

    fn module_base(&self) -> u64 {
        self.base
    }

    fn module_size(&self) -> u32 {
        self.data.borrow().len() as u32
    }

    fn is_alive(&self) -> bool {
        self.alive.get()
    }
}

/// Builder for creating test memory images
///
/// Provides a fluent API for constructing memory layouts for testing.
#[derive(Debug, Clone, Default)]
pub struct MockMemoryBuilder {
    data: Vec<u8>,
    base: u64,
}

impl MockMemoryBuilder {
    /// Create a new builder with default base address (0x1000)
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            base: 0x1000,
        }
    }

    /// Set the base address for the mock
    pub fn base(mut self, base: u64) -> Self {
        self.base = base;
        self
    }

    /// Pre-allocate buffer with zeros up to the specified size
    pub fn with_size(mut self, size: usize) -> Self {
        self.data.resize(size, 0);
        self
    }

    pub fn write_u8(mut self, offset: usize, value: u8) -> Self {
        self.ensure_size(offset + 1);
        self.data[offset] = value;
        self
    }

    /// Write a signed 32-bit integer at the specified offset from base
    pub fn write_i32(mut self, offset: usize, value: i32) -> Self {
        self.ensure_size(offset + 4);
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Write an unsigned 32-bit integer at the specified offset from base
    pub fn write_u32(mut self, offset: usize, value: u32) -> Self {
        self.ensure_size(offset + 4);
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    pub fn write_f32(mut self, offset: usize, value: f32) -> Self {
        self.ensure_size(offset + 4);
        self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        self
    }

    /// Write raw bytes at the specified offset from base
    pub fn write_bytes(mut self, offset: usize, bytes: &[u8]) -> Self {
        self.ensure_size(offset + bytes.len());
        self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
        self
    }

    /// Build the MockMemory
    pub fn build(self) -> MockMemory {
        MockMemory::with_base(self.data, self.base)
    }

    fn ensure_size(&mut self, required: usize) {
        if self.data.len() < required {
            self.data.resize(required, 0);
        }
    }
}
