//! Shared counters and the read-only snapshot the display consumes.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::clock::{elapsed, Millis};
use crate::mode::{presented_mode, Mode, ModeController, PresentedMode};

/// Monotonic activity counters.
///
/// Keys are counted from the BLE write context (discrete taps) and the
/// main loop (queued characters); moves only from the main loop.
/// Plain relaxed atomics: each field has independent, monotonic
/// semantics and is only ever read for display.
pub struct Stats {
    keys: AtomicU32,
    moves: AtomicU32,
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            keys: AtomicU32::new(0),
            moves: AtomicU32::new(0),
        }
    }

    /// One successfully resolved keystroke reached the host.
    pub fn record_key(&self) {
        self.keys.fetch_add(1, Ordering::Relaxed);
    }

    /// One mouse nudge cycle completed.
    pub fn record_move(&self) {
        self.moves.fetch_add(1, Ordering::Relaxed);
    }

    pub fn key_count(&self) -> u32 {
        self.keys.load(Ordering::Relaxed)
    }

    pub fn move_count(&self) -> u32 {
        self.moves.load(Ordering::Relaxed)
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything the display needs, captured once per refresh tick.
/// Nothing flows back from the presentation side.
#[derive(Clone, Copy, Debug)]
pub struct StatusSnapshot {
    pub presented: PresentedMode,
    pub queue_depth: usize,
    pub key_count: u32,
    pub move_count: u32,
    pub uptime_secs: u32,
    pub next_move_secs: u32,
    pub connected: bool,
}

impl StatusSnapshot {
    pub fn capture(
        controller: &ModeController,
        stats: &Stats,
        queue_depth: usize,
        started_at: Millis,
        now: Millis,
    ) -> Self {
        Self {
            presented: presented_mode(controller.mode(), queue_depth),
            queue_depth,
            key_count: stats.key_count(),
            move_count: stats.move_count(),
            uptime_secs: elapsed(started_at, now) / 1_000,
            next_move_secs: controller.time_to_next_move(now) / 1_000,
            connected: controller.mode() == Mode::KeyboardBridge,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::ConnectionEvent;
    use crate::testutil::StepRng;

    #[test]
    fn counters_start_at_zero_and_accumulate() {
        let stats = Stats::new();
        assert_eq!(stats.key_count(), 0);
        assert_eq!(stats.move_count(), 0);
        stats.record_key();
        stats.record_key();
        stats.record_move();
        assert_eq!(stats.key_count(), 2);
        assert_eq!(stats.move_count(), 1);
    }

    #[test]
    fn snapshot_reflects_mode_and_timers() {
        let mut rng = StepRng::constant(3_000); // delays draw as 10_000
        let mut mc = ModeController::new(1_000, &mut rng);
        let stats = Stats::new();
        stats.record_move();

        let snap = StatusSnapshot::capture(&mc, &stats, 0, 1_000, 6_000);
        assert_eq!(snap.presented, PresentedMode::MouseMover);
        assert!(!snap.connected);
        assert_eq!(snap.uptime_secs, 5);
        assert_eq!(snap.next_move_secs, 5); // 10 s delay, 5 s elapsed
        assert_eq!(snap.move_count, 1);

        mc.on_event(ConnectionEvent::Connected, 6_000, &mut rng);
        let snap = StatusSnapshot::capture(&mc, &stats, 12, 1_000, 7_000);
        assert_eq!(snap.presented, PresentedMode::Bridge);
        assert!(snap.connected);
        assert_eq!(snap.queue_depth, 12);
    }

    #[test]
    fn backlog_presents_as_bridge_after_disconnect() {
        let mut rng = StepRng::constant(3_000);
        let mut mc = ModeController::new(0, &mut rng);
        let stats = Stats::new();
        mc.on_event(ConnectionEvent::Connected, 100, &mut rng);
        mc.on_event(ConnectionEvent::Disconnected, 200, &mut rng);

        let snap = StatusSnapshot::capture(&mc, &stats, 4, 0, 300);
        assert_eq!(snap.presented, PresentedMode::Bridge);
        assert!(!snap.connected);
    }
}
