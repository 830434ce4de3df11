pub mod locations;
pub mod run;
pub mod status;

use anyhow::Result;
use meatbridge_core::ProcessHandle;

/// Open the game by PID or find it by name
pub fn open_process(pid: Option<u32>) -> Result<ProcessHandle> {
    match pid {
        Some(pid) => Ok(ProcessHandle::open(pid)?),
        None => Ok(ProcessHandle::find_and_open()?),
    }
}
