//! Configuration.
//!
//! This module contains:
//! - `SlotOptions` - per-seed options sent by the server on connect
//! - `BridgeConfig` - poll loop cadence, built with `BridgeConfigBuilder`
//! - Retry, timing and session constants

mod options;

pub use options::*;

use std::time::Duration;

/// Connection retry configuration.
///
/// Exponential backoff: 500ms → 1s → 2s → 4s → 8s = total ~15.5s before giving up.
pub mod retry {
    use std::time::Duration;

    /// Maximum number of attempts to open the server connection.
    pub const MAX_CONNECT_RETRIES: u32 = 5;

    /// Delay (in ms) after each failed attempt.
    pub const RETRY_DELAYS_MS: [u64; 5] = [500, 1000, 2000, 4000, 8000];

    /// Attempts to wait for the game to load its save block after attaching.
    pub const SAVE_WAIT_ATTEMPTS: u32 = 60;

    pub const SAVE_WAIT_DELAY: Duration = Duration::from_millis(500);
}

/// Poll loop timing.
pub mod timing {
    use std::time::Duration;

    /// Sleep between poll cycles.
    pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

    /// Wait for the game to flush save data after a transition.
    pub const SETTLE_DELAY: Duration = Duration::from_millis(50);

    /// Boss defeats are confirmed this long after leaving the boss level.
    pub const BOSS_SETTLE: Duration = Duration::from_secs(1);

    /// Pending boss resolutions older than this are discarded.
    pub const BOSS_TIMEOUT: Duration = Duration::from_secs(10);

    /// Cadence of the full enforcement pass in any state.
    pub const ENFORCE_INTERVAL: Duration = Duration::from_millis(250);

    /// Cadence of the level select sweep after arrival.
    pub const SWEEP_INTERVAL: Duration = Duration::from_millis(500);

    /// Delay between attempts to find the game process.
    pub const PROCESS_WAIT: Duration = Duration::from_secs(5);
}

/// Server session constants.
pub mod session {
    pub const GAME_NAME: &str = "Super Meat Boy";

    pub const CLIENT_VERSION: (u32, u32, u32) = (0, 5, 1);

    /// Receive own items, remote items and starting inventory
    pub const ITEMS_HANDLING: u8 = 0b111;

    /// `ClientStatus.CLIENT_GOAL`
    pub const GOAL_STATUS: u8 = 30;

    pub const DEFAULT_SERVER: &str = "archipelago.gg:38281";
}

/// Poll loop cadence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub boss_settle: Duration,
    pub boss_timeout: Duration,
    pub enforce_interval: Duration,
    pub sweep_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            poll_interval: timing::POLL_INTERVAL,
            settle_delay: timing::SETTLE_DELAY,
            boss_settle: timing::BOSS_SETTLE,
            boss_timeout: timing::BOSS_TIMEOUT,
            enforce_interval: timing::ENFORCE_INTERVAL,
            sweep_interval: timing::SWEEP_INTERVAL,
        }
    }
}

impl BridgeConfig {
    pub fn builder() -> BridgeConfigBuilder {
        BridgeConfigBuilder::default()
    }
}

/// Builder for [`BridgeConfig`]; unset fields fall back to the `timing` constants
#[derive(Debug, Clone, Default)]
pub struct BridgeConfigBuilder {
    poll_interval: Option<Duration>,
    settle_delay: Option<Duration>,
    boss_settle: Option<Duration>,
    boss_timeout: Option<Duration>,
    enforce_interval: Option<Duration>,
    sweep_interval: Option<Duration>,
}

impl BridgeConfigBuilder {
    pub fn poll_interval(mut self, value: Duration) -> Self {
        self.poll_interval = Some(value);
        self
    }

    pub fn settle_delay(mut self, value: Duration) -> Self {
        self.settle_delay = Some(value);
        self
    }

    pub fn boss_settle(mut self, value: Duration) -> Self {
        self.boss_settle = Some(value);
        self
    }

    pub fn boss_timeout(mut self, value: Duration) -> Self {
        self.boss_timeout = Some(value);
        self
    }

    pub fn enforce_interval(mut self, value: Duration) -> Self {
        self.enforce_interval = Some(value);
        self
    }

    pub fn sweep_interval(mut self, value: Duration) -> Self {
        self.sweep_interval = Some(value);
        self
    }

    pub fn build(self) -> BridgeConfig {
        let defaults = BridgeConfig::default();
        BridgeConfig {
            poll_interval: self.poll_interval.unwrap_or(defaults.poll_interval),
            settle_delay: self.settle_delay.unwrap_or(defaults.settle_delay),
            boss_settle: self.boss_settle.unwrap_or(defaults.boss_settle),
            boss_timeout: self.boss_timeout.unwrap_or(defaults.boss_timeout),
            enforce_interval: self.enforce_interval.unwrap_or(defaults.enforce_interval),
            sweep_interval: self.sweep_interval.unwrap_or(defaults.sweep_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_constants() {
        assert_eq!(retry::MAX_CONNECT_RETRIES, 5);
        assert_eq!(retry::RETRY_DELAYS_MS.len(), 5);
        let total: u64 = retry::RETRY_DELAYS_MS.iter().sum();
        assert_eq!(total, 15_500);
    }

    #[test]
    fn test_boss_window() {
        assert!(timing::BOSS_SETTLE < timing::BOSS_TIMEOUT);
        assert!(timing::ENFORCE_INTERVAL < timing::SWEEP_INTERVAL);
    }

    #[test]
    fn test_builder_defaults() {
        assert_eq!(BridgeConfig::builder().build(), BridgeConfig::default());
    }

    #[test]
    fn test_builder_overrides() {
        let config = BridgeConfig::builder()
            .settle_delay(Duration::ZERO)
            .boss_settle(Duration::from_millis(5))
            .build();
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.boss_settle, Duration::from_millis(5));
        assert_eq!(config.boss_timeout, timing::BOSS_TIMEOUT);
    }
}
