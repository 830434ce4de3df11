//! Core library of the Super Meat Boy multiworld bridge
//!
//! Reads the running game's memory, detects completed locations, enforces
//! progression granted by the server and speaks the client side of the
//! multiworld protocol. The CLI wires these pieces to a real process and a
//! WebSocket connection.

pub mod bridge;
pub mod config;
pub mod detect;
pub mod enforce;
pub mod error;
pub mod game;
pub mod goal;
pub mod memory;
pub mod process;
pub mod progress;
pub mod protocol;
pub mod retry;

pub use bridge::{Bridge, SessionEnd};
pub use config::{BridgeConfig, GoalMode, SlotOptions};
pub use error::{Error, Result};
pub use game::{GameStateSnapshot, LevelRef, Region};
pub use goal::{GoalEvaluator, GoalState};
pub use memory::GameMemory;
pub use process::{ProcessHandle, ProcessInfo, ProcessProvider, ReadMemory, WriteMemory};
pub use progress::{LocationSink, Outbox, ProgressionModel};
pub use protocol::{ClientCommand, ClientSession, ServerEvent, ServerMessage};
pub use retry::{ExponentialBackoff, FixedDelay, RetryStrategy};
