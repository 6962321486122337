use std::time::{Duration, Instant};

/// One-shot wake-up deadline.
///
/// Arming replaces any previous deadline, so at most one wake-up is ever
/// outstanding. Nothing fires by itself: the owner checks [`Wakeup::is_due`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wakeup {
    deadline: Option<Instant>,
}

impl Wakeup {
    pub fn arm(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    pub fn disarm(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if deadline <= now)
    }
}
