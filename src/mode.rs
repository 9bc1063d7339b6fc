//! Operating-mode state machine.
//!
//! `ModeController` is the single source of truth for which behavior is
//! active and carries the mouse-mover countdown across mode switches
//! without drift: connecting pauses the countdown, disconnecting
//! resumes it from the frozen remainder, so time spent in bridge mode
//! never counts against it.
//!
//! The logical mode is deliberately separate from the *presented* mode:
//! after a disconnect the queue may still hold characters, and the
//! bridge screen stays up (and the mover stays gated) until the backlog
//! drains.  [`presented_mode`] and [`mover_may_fire`] make that coupling
//! explicit instead of burying it in comparisons.

use crate::clock::Millis;
use crate::mover::Countdown;
use rand_core::RngCore;

/// Logical operating mode.  Owned exclusively by [`ModeController`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Idle-suppression role: periodic self-canceling cursor nudges.
    MouseMover,
    /// A peer is connected; inbound text/keys replay as USB input.
    KeyboardBridge,
}

/// Wireless link transition, consumed once per occurrence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionEvent {
    Connected,
    Disconnected,
}

/// What the display should show - derived, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PresentedMode {
    MouseMover,
    Bridge,
}

/// Bridge presentation wins whenever there is anything left to type.
pub fn presented_mode(mode: Mode, queue_depth: usize) -> PresentedMode {
    if queue_depth > 0 || mode == Mode::KeyboardBridge {
        PresentedMode::Bridge
    } else {
        PresentedMode::MouseMover
    }
}

/// Mouse motion is permitted only while fully idle: mover mode and an
/// empty queue.  Keeps nudges from interleaving with keystroke output.
pub fn mover_may_fire(mode: Mode, queue_depth: usize) -> bool {
    mode == Mode::MouseMover && queue_depth == 0
}

/// The mode-switching engine.
pub struct ModeController {
    mode: Mode,
    countdown: Countdown,
}

impl ModeController {
    /// Start in mouse-mover mode with a freshly drawn countdown.
    pub fn new(now: Millis, rng: &mut dyn RngCore) -> Self {
        Self {
            mode: Mode::MouseMover,
            countdown: Countdown::start(now, rng),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    /// Apply a link transition.  Returns `true` when the mode actually
    /// changed (callers use it to trigger a display refresh); repeated
    /// same-direction events are no-ops.
    pub fn on_event(&mut self, event: ConnectionEvent, now: Millis, rng: &mut dyn RngCore) -> bool {
        match (self.mode, event) {
            (Mode::MouseMover, ConnectionEvent::Connected) => {
                self.countdown.pause(now);
                self.mode = Mode::KeyboardBridge;
                true
            }
            (Mode::KeyboardBridge, ConnectionEvent::Disconnected) => {
                self.countdown.resume(now, rng);
                self.mode = Mode::MouseMover;
                true
            }
            _ => false,
        }
    }

    /// A move fired: reset the countdown anchor and redraw the delay.
    pub fn record_move(&mut self, now: Millis, rng: &mut dyn RngCore) {
        self.countdown.rearm(now, rng);
    }

    /// Milliseconds until the next move: the live remainder while the
    /// countdown runs, the frozen remainder while bridged.
    pub fn time_to_next_move(&self, now: Millis) -> Millis {
        match self.mode {
            Mode::MouseMover => self.countdown.remaining(now),
            Mode::KeyboardBridge => self.countdown.paused_remaining(),
        }
    }
}
