use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::error::Result;
use crate::game::{LocationId, location_name};

/// Destination of location reports
pub trait LocationSink {
    fn send_location_checks(&mut self, ids: &[LocationId]) -> Result<()>;
    fn send_goal_complete(&mut self) -> Result<()>;
}

/// Deduplicating queue of location reports
///
/// An id enters the acknowledged set when it is sent or when the server says it
/// is already checked; it is never queued again after that. A batch whose send
/// fails is rolled out of the acknowledged set and requeued.
#[derive(Debug, Default)]
pub struct Outbox {
    acknowledged: HashSet<LocationId>,
    pending: Vec<LocationId>,
    /// Ids whose log line was already written
    noted: HashSet<LocationId>,
    goal_pending: bool,
    goal_sent: bool,
}

impl Outbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark ids the server already knows about
    pub fn acknowledge<I: IntoIterator<Item = LocationId>>(&mut self, ids: I) {
        for id in ids {
            self.acknowledged.insert(id);
            self.pending.retain(|p| *p != id);
        }
    }

    /// Replace the acknowledged set with the server's list after a (re)connect
    ///
    /// Ids sent earlier that the server does not list were lost in transit and
    /// are queued again.
    pub fn resync<I: IntoIterator<Item = LocationId>>(&mut self, checked: I) {
        let checked: HashSet<LocationId> = checked.into_iter().collect();
        let mut lost: Vec<LocationId> = self.acknowledged.difference(&checked).copied().collect();
        lost.sort_unstable();

        self.acknowledged = checked;
        self.pending.retain(|id| !self.acknowledged.contains(id));
        for id in lost {
            if !self.pending.contains(&id) {
                debug!("Resending {}", location_name(id));
                self.pending.push(id);
            }
        }
    }

    pub fn is_acknowledged(&self, id: LocationId) -> bool {
        self.acknowledged.contains(&id)
    }

    /// True when the id was sent, acknowledged or is waiting to be sent
    pub fn contains(&self, id: LocationId) -> bool {
        self.acknowledged.contains(&id) || self.pending.contains(&id)
    }

    /// Queue a location report; returns `false` when it is already known
    pub fn report(&mut self, id: LocationId) -> bool {
        if self.contains(id) {
            return false;
        }
        debug!("Queued {}", location_name(id));
        self.pending.push(id);
        true
    }

    /// Returns `true` the first time it is called for `id`
    pub fn note_once(&mut self, id: LocationId) -> bool {
        self.noted.insert(id)
    }

    pub fn noted(&self, id: LocationId) -> bool {
        self.noted.contains(&id)
    }

    pub fn pending(&self) -> &[LocationId] {
        &self.pending
    }

    /// Queue the goal notification; only the first call has an effect
    pub fn report_goal(&mut self) {
        if !self.goal_sent {
            self.goal_pending = true;
        }
    }

    pub fn goal_sent(&self) -> bool {
        self.goal_sent
    }

    /// Send everything queued
    ///
    /// On failure the batch is requeued ahead of anything reported since, and
    /// the error is returned.
    pub fn flush<S: LocationSink + ?Sized>(&mut self, sink: &mut S) -> Result<usize> {
        let mut sent = 0;

        if !self.pending.is_empty() {
            let batch = std::mem::take(&mut self.pending);
            self.acknowledged.extend(batch.iter().copied());

            if let Err(e) = sink.send_location_checks(&batch) {
                warn!("Failed to send {} location checks: {}", batch.len(), e);
                for id in &batch {
                    self.acknowledged.remove(id);
                }
                let newer = std::mem::replace(&mut self.pending, batch);
                self.pending.extend(newer);
                return Err(e);
            }

            for id in &batch {
                info!("Checked {}", location_name(*id));
            }
            sent = batch.len();
        }

        if self.goal_pending {
            sink.send_goal_complete()?;
            self.goal_pending = false;
            self.goal_sent = true;
            info!("Goal complete!");
        }

        Ok(sent)
    }
}
