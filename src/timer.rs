use std::time::{Duration, Instant};

/// A single deferred callback slot, polled from the event loop tick.
///
/// Scheduling replaces whatever was pending, so at most one deadline is ever
/// outstanding per slot.
#[derive(Debug, Default, Clone)]
pub struct OneShot {
    due: Option<Instant>,
}

impl OneShot {
    pub fn new() -> Self {
        Self { due: None }
    }

    pub fn schedule(&mut self, due: Instant) {
        self.due = Some(due);
    }

    pub fn schedule_in(&mut self, now: Instant, delay: Duration) {
        self.schedule(now + delay);
    }

    /// Drop the pending deadline, returning whether one was pending.
    pub fn cancel(&mut self) -> bool {
        self.due.take().is_some()
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn due(&self) -> Option<Instant> {
        self.due
    }

    /// Consume the deadline if it has elapsed at `now`.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }
}
