//! Wraparound-safe elapsed-time arithmetic.
//!
//! All scheduling in the firmware runs off a free-running millisecond
//! counter truncated to `u32`, which wraps roughly every 49.7 days.
//! Every countdown and timeout decision must go through [`elapsed`];
//! a direct `current - start` anywhere else is a latent bug that shows
//! up weeks after power-on as an instant-fire or a 49-day stall.

/// Milliseconds on the free-running counter.
pub type Millis = u32;

/// Elapsed time from `start` to `current`, assuming the counter wrapped
/// at most once.
///
/// If `current >= start` this is plain subtraction; otherwise the
/// distance across the wrap boundary: `(MAX - start) + current + 1`.
pub const fn elapsed(start: Millis, current: Millis) -> Millis {
    if current >= start {
        current - start
    } else {
        (Millis::MAX - start) + current + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_distance() {
        assert_eq!(elapsed(0, 0), 0);
        assert_eq!(elapsed(100, 250), 150);
        assert_eq!(elapsed(0, Millis::MAX), Millis::MAX);
    }

    #[test]
    fn wrapped_distance() {
        // Counter wrapped: 5 ticks before the boundary, 10 after.
        assert_eq!(elapsed(Millis::MAX - 4, 10), 15);
        // One tick across the boundary.
        assert_eq!(elapsed(Millis::MAX, 0), 1);
    }

    #[test]
    fn wrap_is_monotonically_consistent() {
        // Walking a simulated counter across the boundary never produces
        // a jump backwards.
        let start = Millis::MAX - 3;
        let mut last = 0;
        for step in 0..8u32 {
            let now = start.wrapping_add(step);
            let e = elapsed(start, now);
            assert!(e >= last);
            assert_eq!(e, step);
            last = e;
        }
    }
}
