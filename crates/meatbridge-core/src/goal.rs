//! Goal evaluation

use std::collections::BTreeSet;

use strum::Display;
use tracing::{debug, info};

use crate::config::GoalMode;
use crate::detect::BossDefeat;
use crate::game::locations::{LocationId, boss_location};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum GoalState {
    InProgress,
    Completed,
}

/// Tracks boss kills against the seed's goal
///
/// The goal completes on the first qualifying boss confirmation at which enough
/// bandages have been received. `Completed` is terminal.
#[derive(Debug, Clone)]
pub struct GoalEvaluator {
    mode: GoalMode,
    bandages_required: u32,
    defeated: BTreeSet<u8>,
    state: GoalState,
}

impl GoalEvaluator {
    pub fn new(mode: GoalMode, bandages_required: u32) -> Self {
        Self {
            mode,
            bandages_required,
            defeated: BTreeSet::new(),
            state: GoalState::InProgress,
        }
    }

    pub fn state(&self) -> GoalState {
        self.state
    }

    pub fn mode(&self) -> GoalMode {
        self.mode
    }

    /// Count bosses the server already has as checked, e.g. from before a restart
    ///
    /// Only feeds the all-bosses condition; it never completes the goal by itself.
    pub fn record_prior_bosses(&mut self, checked: &[LocationId]) {
        for world in 1..=5 {
            if boss_location(world).is_some_and(|id| checked.contains(&id))
                && self.defeated.insert(world)
            {
                debug!("World {} boss already defeated", world);
            }
        }
    }

    /// Record a confirmed boss kill
    ///
    /// Returns `true` exactly once: on the call that completes the goal.
    pub fn record_boss(&mut self, defeat: BossDefeat, bandage_count: u32) -> bool {
        if !defeat.dark {
            self.defeated.insert(defeat.world);
        }
        if self.state == GoalState::Completed || !self.triggered_by(defeat) {
            return false;
        }

        if bandage_count < self.bandages_required {
            info!(
                "{} reached but {} of {} bandages collected",
                self.mode, bandage_count, self.bandages_required
            );
            return false;
        }

        self.state = GoalState::Completed;
        info!("Goal reached: {}", self.mode);
        true
    }

    fn triggered_by(&self, defeat: BossDefeat) -> bool {
        match self.mode {
            GoalMode::BeatRaptureBoss => defeat.world == 5 && !defeat.dark,
            GoalMode::BeatAllBosses => (1..=5).all(|w| self.defeated.contains(&w)),
            GoalMode::BeatDrFetus => defeat.world == 6 && !defeat.dark,
            GoalMode::BeatDarkDrFetus => defeat.world == 6 && defeat.dark,
        }
    }
}
