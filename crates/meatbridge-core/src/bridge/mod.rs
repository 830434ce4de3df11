//! The bridge between the game and the multiworld server
//!
//! [`Bridge`] owns the progression model, the outbox, the detector and the
//! goal evaluator. It outlives individual game processes and server sessions:
//! after a reconnect it keeps what was granted and reported, and re-syncs the
//! save block on the next cycle.

mod game_loop;

use std::time::Instant;

use strum::Display;
use tracing::{debug, info};

use crate::config::{BridgeConfig, SlotOptions};
use crate::detect::Detector;
use crate::error::{Error, Result};
use crate::game::{GameStateSnapshot, ItemId};
use crate::goal::{GoalEvaluator, GoalState};
use crate::progress::{Grant, LocationSink, Outbox, ProgressionModel};
use crate::protocol::ServerEvent;

/// Why [`Bridge::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum SessionEnd {
    #[strum(serialize = "shutdown requested")]
    Shutdown,
    #[strum(serialize = "game process exited")]
    ProcessLost,
    #[strum(serialize = "server session closed")]
    SessionClosed,
}

pub struct Bridge {
    config: BridgeConfig,
    model: ProgressionModel,
    outbox: Outbox,
    detector: Detector,
    goal: Option<GoalEvaluator>,
    options: Option<SlotOptions>,
    /// Items received before the slot options arrived
    backlog: Vec<(u64, ItemId)>,
    prev: Option<GameStateSnapshot>,
    /// The current session has sent `Connected`; reports may go out
    session_ready: bool,
    needs_sync: bool,
    items_changed: bool,
    last_enforce: Option<Instant>,
    last_sweep: Option<Instant>,
}

impl Bridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            model: ProgressionModel::new(),
            outbox: Outbox::new(),
            detector: Detector::new(),
            goal: None,
            options: None,
            backlog: Vec::new(),
            prev: None,
            session_ready: false,
            needs_sync: false,
            items_changed: false,
            last_enforce: None,
            last_sweep: None,
        }
    }

    pub fn model(&self) -> &ProgressionModel {
        &self.model
    }

    pub fn outbox(&self) -> &Outbox {
        &self.outbox
    }

    pub fn options(&self) -> Option<&SlotOptions> {
        self.options.as_ref()
    }

    pub fn goal_state(&self) -> GoalState {
        self.goal
            .as_ref()
            .map_or(GoalState::InProgress, GoalEvaluator::state)
    }

    /// Apply one event from the server
    ///
    /// A refused connection is returned as [`Error::ConnectionRefused`].
    pub fn handle_event(&mut self, event: ServerEvent) -> Result<()> {
        match event {
            ServerEvent::Connected {
                checked_locations,
                options,
            } => {
                let goal = self.goal.get_or_insert_with(|| {
                    GoalEvaluator::new(options.goal, options.bandages_required)
                });
                goal.record_prior_bosses(&checked_locations);
                self.outbox.resync(checked_locations);
                for (index, item) in std::mem::take(&mut self.backlog) {
                    self.grant(index, item, &options);
                }
                self.options = Some(options);
                self.session_ready = true;
                self.needs_sync = true;
            }
            ServerEvent::LocationsChecked { ids } => {
                debug!("Server marked {} locations checked", ids.len());
                self.outbox.acknowledge(ids);
            }
            ServerEvent::ReceivedItem { index, item, .. } => match self.options.clone() {
                Some(options) => self.grant(index, item, &options),
                None => self.backlog.push((index, item)),
            },
            ServerEvent::ConnectionRefused { reasons } => {
                return Err(Error::ConnectionRefused(reasons));
            }
        }
        Ok(())
    }

    fn grant(&mut self, index: u64, item: ItemId, options: &SlotOptions) {
        if let Grant::Applied(effect) = self.model.apply_item(index, item, options) {
            debug!("Item #{} -> {:?}", index, effect);
            self.items_changed = true;
        }
    }

    /// Forget everything tied to the attached process
    ///
    /// Call after attaching to a new process; the next cycle re-syncs the save
    /// block if the server session is up.
    pub fn attach(&mut self) {
        self.detector.reset();
        self.prev = None;
        self.last_enforce = None;
        self.last_sweep = None;
        self.needs_sync = self.options.is_some();
    }

    /// Send queued reports through `sink`
    pub fn flush<S: LocationSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let sent = self.outbox.flush(sink)?;
        if sent > 0 {
            info!("Sent {} location checks", sent);
        }
        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::locations::BASE_ID;

    fn connected(checked: Vec<i64>) -> ServerEvent {
        ServerEvent::Connected {
            checked_locations: checked,
            options: SlotOptions::default(),
        }
    }

    #[test]
    fn test_connect_acknowledges_checked() {
        let mut bridge = Bridge::new(BridgeConfig::default());
        bridge.handle_event(connected(vec![BASE_ID + 1])).unwrap();
        assert!(bridge.outbox().is_acknowledged(BASE_ID + 1));
        assert!(bridge.needs_sync);
        assert_eq!(bridge.goal_state(), GoalState::InProgress);
    }

    #[test]
    fn test_attach_requires_session_for_sync() {
        let mut bridge = Bridge::new(BridgeConfig::default());
        bridge.attach();
        assert!(!bridge.needs_sync);

        bridge.handle_event(connected(vec![])).unwrap();
        bridge.needs_sync = false;
        bridge.attach();
        assert!(bridge.needs_sync);
    }

    #[test]
    fn test_refusal_is_an_error() {
        let mut bridge = Bridge::new(BridgeConfig::default());
        let err = bridge
            .handle_event(ServerEvent::ConnectionRefused {
                reasons: vec!["InvalidSlot".into()],
            })
            .unwrap_err();
        assert!(matches!(err, Error::ConnectionRefused(_)));
    }

    #[test]
    fn test_session_end_display() {
        assert_eq!(SessionEnd::ProcessLost.to_string(), "game process exited");
    }
}
