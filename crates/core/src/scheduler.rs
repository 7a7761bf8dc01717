// Frame callbacks for the UI event loop

use crate::animation::AnimationToken;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A pending frame callback for one animation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    pub token: AnimationToken,
    pub due: Instant,
}

/// Single-threaded queue of frame callbacks.
///
/// Requests are never removed on cancellation. A cancelled run's request stays
/// queued until it is due and is then discarded by the token check, exactly
/// like a timer callback that was already in flight.
#[derive(Debug)]
pub struct FrameScheduler {
    interval: Duration,
    pending: VecDeque<FrameRequest>,
}

impl FrameScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: VecDeque::new(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Queue a frame for `token` one interval after `now`
    pub fn schedule(&mut self, token: AnimationToken, now: Instant) {
        let due = now + self.interval;
        // Keep the queue ordered by due time
        let index = self
            .pending
            .iter()
            .position(|req| req.due > due)
            .unwrap_or(self.pending.len());
        self.pending.insert(index, FrameRequest { token, due });
    }

    /// Earliest due time, used by the event loop as its wake-up deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.front().map(|req| req.due)
    }

    /// Pop the next request that is due at `now`
    pub fn pop_due(&mut self, now: Instant) -> Option<FrameRequest> {
        match self.pending.front() {
            Some(req) if req.due <= now => self.pending.pop_front(),
            _ => None,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::SeekAnimation;

    #[test]
    fn test_requests_fire_in_due_order() {
        let t0 = Instant::now();
        let mut anim = SeekAnimation::new(0.0);
        let token = anim.start(10.0, t0);
        let mut frames = FrameScheduler::new(Duration::from_millis(16));

        frames.schedule(token, t0 + Duration::from_millis(10));
        frames.schedule(token, t0);

        assert_eq!(frames.next_deadline(), Some(t0 + Duration::from_millis(16)));
        assert!(frames.pop_due(t0 + Duration::from_millis(15)).is_none());

        let first = frames.pop_due(t0 + Duration::from_millis(30)).unwrap();
        assert_eq!(first.due, t0 + Duration::from_millis(16));
        let second = frames.pop_due(t0 + Duration::from_millis(30)).unwrap();
        assert_eq!(second.due, t0 + Duration::from_millis(26));
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn test_clear() {
        let t0 = Instant::now();
        let mut anim = SeekAnimation::new(0.0);
        let token = anim.start(10.0, t0);
        let mut frames = FrameScheduler::new(Duration::from_millis(16));
        frames.schedule(token, t0);
        frames.clear();
        assert_eq!(frames.next_deadline(), None);
    }
}
