//! Mouse-move scheduling: randomized delays and the pausable countdown.
//!
//! The mover emits a minimal, self-canceling cursor motion (one unit
//! right, then one unit left) often enough to reset host idle timers.
//! Delays are drawn uniformly from a wide range instead of a fixed
//! interval so the traffic has no periodic signature and never locks
//! phase with other host activity.

use crate::clock::{elapsed, Millis};
use crate::config::{MOVE_DELAY_MAX_MS, MOVE_DELAY_MIN_MS};
use rand_core::RngCore;

/// Draw the next inter-move delay, uniform in
/// [`MOVE_DELAY_MIN_MS`, `MOVE_DELAY_MAX_MS`] inclusive.
pub fn draw_delay(rng: &mut dyn RngCore) -> Millis {
    let span = MOVE_DELAY_MAX_MS - MOVE_DELAY_MIN_MS + 1;
    MOVE_DELAY_MIN_MS + rng.next_u32() % span
}

/// Countdown to the next mouse move.
///
/// At most one of the two timing views is meaningful at a time: while
/// running, `last_move_at`/`next_delay` track the live countdown; while
/// the bridge is active, `paused_remaining` holds the frozen remainder.
/// The remainder is consumed exactly once on resume - if none was
/// stored, resume draws a fresh delay instead.
#[derive(Clone, Copy, Debug)]
pub struct Countdown {
    last_move_at: Millis,
    next_delay: Millis,
    paused_remaining: Millis,
}

impl Countdown {
    /// Start a fresh countdown at `now`.
    pub fn start(now: Millis, rng: &mut dyn RngCore) -> Self {
        Self {
            last_move_at: now,
            next_delay: draw_delay(rng),
            paused_remaining: 0,
        }
    }

    /// True once the drawn delay has fully elapsed.
    pub fn is_due(&self, now: Millis) -> bool {
        elapsed(self.last_move_at, now) >= self.next_delay
    }

    /// Milliseconds until the next move fires (0 when due).
    pub fn remaining(&self, now: Millis) -> Millis {
        self.next_delay.saturating_sub(elapsed(self.last_move_at, now))
    }

    /// Freeze the countdown: store whatever is left of the current
    /// delay so time spent in bridge mode does not count against it.
    pub fn pause(&mut self, now: Millis) {
        self.paused_remaining = self.remaining(now);
    }

    /// Restart the countdown at `now`, resuming from the paused
    /// remainder if one was stored, else from a fresh random delay.
    pub fn resume(&mut self, now: Millis, rng: &mut dyn RngCore) {
        self.last_move_at = now;
        self.next_delay = if self.paused_remaining > 0 {
            self.paused_remaining
        } else {
            draw_delay(rng)
        };
        self.paused_remaining = 0;
    }

    /// Re-arm after a move fired: reset the anchor and redraw.
    pub fn rearm(&mut self, now: Millis, rng: &mut dyn RngCore) {
        self.last_move_at = now;
        self.next_delay = draw_delay(rng);
    }

    /// Currently armed delay (for display scaling).
    pub fn next_delay(&self) -> Millis {
        self.next_delay
    }

    /// Frozen remainder, nonzero only while paused.
    pub fn paused_remaining(&self) -> Millis {
        self.paused_remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::StepRng;

    #[test]
    fn delay_always_within_bounds() {
        let mut rng = StepRng::new(0x1234_5678);
        for _ in 0..10_000 {
            let d = draw_delay(&mut rng);
            assert!((MOVE_DELAY_MIN_MS..=MOVE_DELAY_MAX_MS).contains(&d));
        }
        // Degenerate generator outputs hit the bounds exactly.
        let mut zero = StepRng::constant(0);
        assert_eq!(draw_delay(&mut zero), MOVE_DELAY_MIN_MS);
        let mut max = StepRng::constant(MOVE_DELAY_MAX_MS - MOVE_DELAY_MIN_MS);
        assert_eq!(draw_delay(&mut max), MOVE_DELAY_MAX_MS);
    }

    #[test]
    fn due_exactly_at_the_drawn_delay() {
        let mut rng = StepRng::constant(3_000); // next_delay = 10_000
        let cd = Countdown::start(0, &mut rng);
        assert_eq!(cd.next_delay(), 10_000);
        assert!(!cd.is_due(9_999));
        assert!(cd.is_due(10_000));
        assert!(cd.is_due(10_001));
    }

    #[test]
    fn due_survives_counter_wrap() {
        let mut rng = StepRng::constant(1_000); // next_delay = 8_000
        let start = Millis::MAX - 2_000;
        let cd = Countdown::start(start, &mut rng);
        // 2_001 ms before the wrap + 5_999 after = 8_000 elapsed.
        assert!(!cd.is_due(5_998));
        assert!(cd.is_due(5_999));
    }

    #[test]
    fn pause_stores_exact_remainder() {
        let mut rng = StepRng::constant(3_000); // next_delay = 10_000
        let mut cd = Countdown::start(0, &mut rng);
        cd.pause(4_000);
        assert_eq!(cd.paused_remaining(), 6_000);
    }

    #[test]
    fn pause_past_due_stores_zero() {
        let mut rng = StepRng::constant(3_000);
        let mut cd = Countdown::start(0, &mut rng);
        cd.pause(15_000);
        assert_eq!(cd.paused_remaining(), 0);
    }

    #[test]
    fn resume_consumes_remainder_once() {
        let mut rng = StepRng::constant(3_000); // draws are 10_000
        let mut cd = Countdown::start(0, &mut rng);
        cd.pause(4_000);
        cd.resume(20_000, &mut rng);
        // Resumed with the stored 6_000, not a fresh draw.
        assert_eq!(cd.next_delay(), 6_000);
        assert_eq!(cd.paused_remaining(), 0);
        assert!(!cd.is_due(25_999));
        assert!(cd.is_due(26_000));

        // A second resume with nothing stored falls back to a draw.
        cd.resume(30_000, &mut rng);
        assert_eq!(cd.next_delay(), 10_000);
    }
}
