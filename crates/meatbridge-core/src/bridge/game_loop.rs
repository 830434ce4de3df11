//! Poll loop of the bridge
//!
//! One cycle: drain server events, read a snapshot, settle a pending boss,
//! detect edges, enforce and sweep on the selection screens, flush reports.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, TryRecvError};
use std::thread;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::SlotOptions;
use crate::detect::{BossDefeat, DetectContext, aggregate, sweep};
use crate::enforce;
use crate::error::{Error, Result};
use crate::game::GameStateSnapshot;
use crate::memory::{GameMemory, SaveData};
use crate::process::{ProcessInfo, ReadMemory, WriteMemory};
use crate::progress::LocationSink;
use crate::protocol::ServerEvent;

use super::{Bridge, SessionEnd};

impl Bridge {
    /// Run until shutdown, process exit or the end of the server session
    ///
    /// `inbound` carries events from the connection; its sender being dropped
    /// ends the session. A refused connection is returned as an error.
    pub fn run<M, S>(
        &mut self,
        memory: &M,
        sink: &mut S,
        inbound: &Receiver<ServerEvent>,
        shutdown_requested: &AtomicBool,
    ) -> Result<SessionEnd>
    where
        M: ReadMemory + WriteMemory + ProcessInfo,
        S: LocationSink + ?Sized,
    {
        info!("Bridge running for PID {}", memory.pid());
        self.attach();
        self.session_ready = false;

        loop {
            if shutdown_requested.load(Ordering::SeqCst) {
                info!("Shutdown requested, stopping bridge");
                return Ok(SessionEnd::Shutdown);
            }

            if !memory.is_alive() {
                info!("Game process terminated");
                return Ok(SessionEnd::ProcessLost);
            }

            loop {
                match inbound.try_recv() {
                    Ok(event) => self.handle_event(event)?,
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        info!("Server session closed");
                        return Ok(SessionEnd::SessionClosed);
                    }
                }
            }

            self.poll(memory, Instant::now());

            if self.session_ready {
                match self.flush(sink) {
                    Ok(_) => {}
                    Err(Error::SessionClosed) => return Ok(SessionEnd::SessionClosed),
                    // Already logged by the outbox; the batch is retried next cycle
                    Err(e) => debug!("Flush deferred: {}", e),
                }
            }

            thread::sleep(self.config.poll_interval);
        }
    }

    /// Run one detection and enforcement cycle against `memory`
    pub fn poll<M: ReadMemory + WriteMemory>(&mut self, memory: &M, now: Instant) {
        let game = GameMemory::new(memory);

        let Some(cur) = game.read_state() else {
            // Unreadable globals, e.g. during a load
            self.prev = None;
            return;
        };

        let (Some(options), Some(save)) = (self.options.clone(), game.save_data()) else {
            self.prev = Some(cur);
            return;
        };

        if self.needs_sync {
            self.sync(save, &options);
            self.last_enforce = Some(now);
        }

        if let Some(defeat) = self.detector.settle_boss(&cur, &self.config, now) {
            self.confirm_boss(defeat, save, &options);
        }

        let prev = self.prev.replace(cur);
        let mut enforce_now = std::mem::take(&mut self.items_changed);

        if let Some(prev) = prev {
            let mut ctx = DetectContext {
                save,
                model: &self.model,
                options: &options,
                outbox: &mut self.outbox,
            };
            let observed = self.detector.observe(&prev, &cur, &mut ctx, &self.config, now);
            if let Some(world) = observed.exited {
                debug!("Left a level in world {}", world);
                enforce_now = true;
            }
        }

        let arrived = |on: fn(&GameStateSnapshot) -> bool| on(&cur) && !prev.is_some_and(|p| on(&p));

        if arrived(GameStateSnapshot::on_world_select) {
            enforce_now = true;
        }
        let enforce_due = self
            .last_enforce
            .is_none_or(|t| now.saturating_duration_since(t) >= self.config.enforce_interval);
        if enforce_now || enforce_due {
            self.enforce(save, &options);
            self.last_enforce = Some(now);
        }

        if cur.on_level_select() && cur.valid_world() {
            let sweep_due = self
                .last_sweep
                .is_none_or(|t| now.saturating_duration_since(t) >= self.config.sweep_interval);
            if arrived(GameStateSnapshot::on_level_select) || sweep_due {
                let mut ctx = DetectContext {
                    save,
                    model: &self.model,
                    options: &options,
                    outbox: &mut self.outbox,
                };
                sweep::sweep_world(&mut ctx, cur.world);
                self.last_sweep = Some(now);
            }
        }
    }

    /// Enforce everything granted so far, then re-derive all locations
    fn sync<M: ReadMemory + WriteMemory>(&mut self, save: SaveData<'_, M>, options: &SlotOptions) {
        let writes = enforce::full_pass(save, &mut self.model, options);
        let mut ctx = DetectContext {
            save,
            model: &self.model,
            options,
            outbox: &mut self.outbox,
        };
        sweep::sweep_all(&mut ctx);
        self.needs_sync = false;
        info!(
            "Synced save data ({} writes, {} reports queued)",
            writes,
            self.outbox.pending().len()
        );
    }

    fn enforce<M: ReadMemory + WriteMemory>(&mut self, save: SaveData<'_, M>, options: &SlotOptions) {
        enforce::full_pass(save, &mut self.model, options);
        let mut ctx = DetectContext {
            save,
            model: &self.model,
            options,
            outbox: &mut self.outbox,
        };
        aggregate::check_aggregates(&mut ctx);
    }

    fn confirm_boss<M: ReadMemory + WriteMemory>(
        &mut self,
        defeat: BossDefeat,
        save: SaveData<'_, M>,
        options: &SlotOptions,
    ) {
        match defeat.location(options) {
            Some(id) => {
                if self.outbox.report(id) {
                    info!("Defeated the world {} boss", defeat.world);
                }
            }
            None => info!("Defeated the world {} boss (no location)", defeat.world),
        }

        if let Some(goal) = self.goal.as_mut()
            && goal.record_boss(defeat, self.model.bandage_count())
        {
            self.outbox.report_goal();
        }

        self.enforce(save, options);
    }
}
