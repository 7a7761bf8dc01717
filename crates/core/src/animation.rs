// Seek-position interpolation with generation-token cancellation

use std::time::{Duration, Instant};

/// Identifies one interpolation run.
///
/// Frame callbacks carry the token they were scheduled with; once the run is
/// cancelled or restarted the token goes stale and its ticks are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationToken(u64);

impl AnimationToken {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Outcome of feeding a frame into the animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// The token belongs to a cancelled run; nothing changed
    Stale,
    /// Still running; new interpolated value
    Advanced(f32),
    /// Reached the target; the animation is stopped at this value
    Finished(f32),
}

#[derive(Debug, Clone, Copy)]
struct Run {
    token: AnimationToken,
    from: f32,
    target: f32,
    started_at: Instant,
    length: Duration,
}

impl Run {
    fn value_at(&self, now: Instant) -> f32 {
        if self.length.is_zero() {
            return self.target;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        let fraction = (elapsed.as_secs_f64() / self.length.as_secs_f64()).min(1.0);
        let value = self.from as f64 + (self.target - self.from) as f64 * fraction;
        (value as f32).clamp(self.from.min(self.target), self.from.max(self.target))
    }

    fn is_complete_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.length
    }
}

/// Animated seek value: `Stopped(value)` or `Playing(value, target)`.
///
/// Runs are linear at real-time rate, so a run from `p` to `d` lasts `d - p`
/// seconds. At most one run exists at a time; starting, stopping or snapping
/// always retires the previous token first.
#[derive(Debug)]
pub struct SeekAnimation {
    value: f32,
    generation: u64,
    run: Option<Run>,
}

impl SeekAnimation {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            generation: 0,
            run: None,
        }
    }

    /// Last applied value (frozen value while stopped)
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn is_running(&self) -> bool {
        self.run.is_some()
    }

    /// Token of the active run, if any
    pub fn active_token(&self) -> Option<AnimationToken> {
        self.run.map(|run| run.token)
    }

    pub fn target(&self) -> Option<f32> {
        self.run.map(|run| run.target)
    }

    /// Start a linear run from the current value to `target`.
    /// A run already in flight is cancelled first.
    pub fn start(&mut self, target: f32, now: Instant) -> AnimationToken {
        let token = self.next_token();
        let length = Duration::from_secs_f32((target - self.value).max(0.0));
        self.run = Some(Run {
            token,
            from: self.value,
            target,
            started_at: now,
            length,
        });
        log::debug!(
            "Animation {} started: {:.3}s -> {:.3}s over {:?}",
            token.0,
            self.value,
            target,
            length
        );
        token
    }

    /// Cancel the active run, freezing at its interpolated value for `now`
    pub fn stop(&mut self, now: Instant) -> f32 {
        if let Some(run) = self.run.take() {
            self.value = run.value_at(now);
            self.next_token();
            log::debug!("Animation {} stopped at {:.3}s", run.token.0, self.value);
        }
        self.value
    }

    /// Cancel any run and jump to `value`
    pub fn snap_to(&mut self, value: f32) {
        if self.run.take().is_some() {
            log::debug!("Animation cancelled by snap to {:.3}s", value);
        }
        self.next_token();
        self.value = value;
    }

    /// Apply a frame scheduled with `token`
    pub fn tick(&mut self, token: AnimationToken, now: Instant) -> Tick {
        let run = match self.run {
            Some(run) if run.token == token => run,
            _ => return Tick::Stale,
        };

        if run.is_complete_at(now) {
            self.value = run.target;
            self.run = None;
            self.next_token();
            log::debug!("Animation {} finished at {:.3}s", token.0, self.value);
            Tick::Finished(self.value)
        } else {
            self.value = run.value_at(now);
            log::trace!("Animation {} tick: {:.3}s", token.0, self.value);
            Tick::Advanced(self.value)
        }
    }

    fn next_token(&mut self) -> AnimationToken {
        self.generation += 1;
        AnimationToken(self.generation)
    }
}

impl Default for SeekAnimation {
    fn default() -> Self {
        Self::new(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(s: f32) -> Duration {
        Duration::from_secs_f32(s)
    }

    #[test]
    fn test_run_lasts_remaining_duration() {
        let t0 = Instant::now();
        let mut anim = SeekAnimation::new(30.0);
        let token = anim.start(90.0, t0);

        assert_eq!(anim.tick(token, t0 + secs(59.9)), Tick::Advanced(anim.value()));
        assert!(anim.is_running());
        assert_eq!(anim.tick(token, t0 + secs(60.0)), Tick::Finished(90.0));
        assert!(!anim.is_running());
        assert_eq!(anim.value(), 90.0);
    }

    #[test]
    fn test_linear_pacing() {
        let t0 = Instant::now();
        let mut anim = SeekAnimation::new(0.0);
        let token = anim.start(100.0, t0);

        match anim.tick(token, t0 + secs(25.0)) {
            Tick::Advanced(v) => assert!((v - 25.0).abs() < 1e-3),
            other => panic!("unexpected tick: {:?}", other),
        }
    }

    #[test]
    fn test_stop_freezes_and_retires_token() {
        let t0 = Instant::now();
        let mut anim = SeekAnimation::new(10.0);
        let token = anim.start(20.0, t0);

        let frozen = anim.stop(t0 + secs(4.0));
        assert!((frozen - 14.0).abs() < 1e-3);
        assert!(!anim.is_running());
        assert_eq!(anim.tick(token, t0 + secs(5.0)), Tick::Stale);
        assert_eq!(anim.value(), frozen);
    }

    #[test]
    fn test_restart_cancels_previous_run() {
        let t0 = Instant::now();
        let mut anim = SeekAnimation::new(0.0);
        let first = anim.start(60.0, t0);

        anim.snap_to(30.0);
        let second = anim.start(60.0, t0 + secs(1.0));
        assert_ne!(first, second);
        assert_eq!(anim.active_token(), Some(second));

        assert_eq!(anim.tick(first, t0 + secs(2.0)), Tick::Stale);
        assert_eq!(anim.value(), 30.0);
        match anim.tick(second, t0 + secs(2.0)) {
            Tick::Advanced(v) => assert!((v - 31.0).abs() < 1e-3),
            other => panic!("unexpected tick: {:?}", other),
        }
    }

    #[test]
    fn test_zero_length_run_finishes_on_first_frame() {
        let t0 = Instant::now();
        let mut anim = SeekAnimation::new(42.0);
        let token = anim.start(42.0, t0);
        assert_eq!(anim.tick(token, t0), Tick::Finished(42.0));
    }

    #[test]
    fn test_stop_without_run_is_noop() {
        let mut anim = SeekAnimation::new(5.0);
        assert_eq!(anim.stop(Instant::now()), 5.0);
        assert!(anim.active_token().is_none());
    }

    proptest! {
        #[test]
        fn prop_paused_value_stays_within_bounds(
            start in 0.0f32..500.0,
            extra in 0.5f32..500.0,
            pause_after in 0.0f32..1000.0,
        ) {
            let t0 = Instant::now();
            let target = start + extra;
            let mut anim = SeekAnimation::new(start);
            let token = anim.start(target, t0);
            let frozen = anim.stop(t0 + secs(pause_after));

            prop_assert!(frozen >= start && frozen <= target);
            prop_assert_eq!(anim.tick(token, t0 + secs(pause_after + 1.0)), Tick::Stale);
            prop_assert_eq!(anim.value(), frozen);
        }

        #[test]
        fn prop_only_latest_token_is_live(restarts in 1usize..20) {
            let t0 = Instant::now();
            let mut anim = SeekAnimation::new(0.0);
            let mut tokens = Vec::new();
            for i in 0..restarts {
                anim.snap_to(i as f32);
                tokens.push(anim.start(100.0, t0));
            }
            let (latest, older) = tokens.split_last().unwrap();
            for token in older {
                prop_assert_eq!(anim.tick(*token, t0 + secs(0.5)), Tick::Stale);
            }
            prop_assert_eq!(anim.active_token(), Some(*latest));
        }
    }
}
