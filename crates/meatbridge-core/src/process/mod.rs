mod handle;
pub mod layout;
pub mod provider;
mod reader;

// Mock process memory for testing (always available for unit and integration tests)
#[doc(hidden)]
pub mod mock;

pub use handle::*;
pub use provider::{ProcessInfo, ProcessProvider};
pub use reader::{ProcessMemory, ReadMemory, WriteMemory};

#[doc(hidden)]
pub use mock::{MockMemory, MockMemoryBuilder};
