//! Process provider abstraction for testability.
//!
//! The bridge loop only needs to know whether the game is still running, and the
//! CLI only needs a way to find it. Both go through these traits so neither
//! depends on a live `SuperMeatBoy.exe`.

use crate::error::Result;

/// Properties of an attached process.
pub trait ProcessInfo {
    fn pid(&self) -> u32;

    /// Base address of the main module.
    fn module_base(&self) -> u64;

    fn module_size(&self) -> u32;

    /// Check if the process is still running.
    fn is_alive(&self) -> bool;
}

/// Finds and opens the game process.
pub trait ProcessProvider {
    type Process: ProcessInfo;

    /// Find and open the game by executable name.
    fn find_process(&self) -> Result<Self::Process>;

    /// Open a process by its PID.
    fn open_process(&self, pid: u32) -> Result<Self::Process>;
}
