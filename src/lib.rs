//! Host-testable core of the keybridge firmware.
//!
//! The pure modules (queue, mode machine, timing, scheduler, keystroke
//! translation, status) build on the host with default features for
//! `cargo test`; the transport/output plumbing (BLE, USB, display,
//! LED) only exists behind the `embedded` feature, which the binary
//! enables.
//!
//! Note: the embedded binary is `main.rs` with `#![no_std]` and
//! `#![no_main]`; this crate root stays `no_std`-clean so both sides
//! share one module tree.

#![cfg_attr(not(test), no_std)]

pub mod clock;
pub mod config;
pub mod error;
pub mod hid;
pub mod mode;
pub mod mover;
pub mod queue;
pub mod status;
pub mod ui;

#[cfg(feature = "embedded")]
pub mod ble;
#[cfg(feature = "embedded")]
pub mod led;
#[cfg(feature = "embedded")]
pub mod usb;

#[cfg(test)]
pub(crate) mod testutil;

// ═══════════════════════════════════════════════════════════════════════════
// Cross-component tests - the paths a single module test cannot cover
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use crate::hid::translate::{char_reports, translate, KeyEvent, MOD_LSHIFT};
    use crate::hid::KeyboardReport;
    use crate::mode::{mover_may_fire, presented_mode, ConnectionEvent, Mode, PresentedMode, ModeController};
    use crate::queue::TextQueue;
    use crate::status::Stats;
    use crate::testutil::StepRng;

    /// A paste drains into exactly the report sequence the host
    /// should see: shift-press 'H', release, press 'i', release.
    #[test]
    fn paste_drains_to_tap_pairs() {
        let mut q = TextQueue::new();
        assert_eq!(q.enqueue(b"Hi"), 2);

        let stats = Stats::new();
        let mut emitted = heapless::Vec::<KeyboardReport, 8>::new();
        while let Some(c) = q.dequeue_one() {
            let (press, release) = char_reports(c).unwrap();
            emitted.push(press).unwrap();
            emitted.push(release).unwrap();
            stats.record_key();
        }

        assert_eq!(emitted.len(), 4);
        assert_eq!(emitted[0], KeyboardReport::press(MOD_LSHIFT, 0x0B)); // 'H'
        assert_eq!(emitted[1], KeyboardReport::RELEASE);
        assert_eq!(emitted[2], KeyboardReport::press(0, 0x0C)); // 'i'
        assert_eq!(emitted[3], KeyboardReport::RELEASE);
        assert_eq!(stats.key_count(), 2);
    }

    /// The mover stays gated while a disconnected device is still
    /// draining its backlog, and un-gates the moment it empties.
    #[test]
    fn backlog_gates_the_mover_after_disconnect() {
        let mut rng = StepRng::constant(0); // delays draw as 7_000
        let mut mc = ModeController::new(0, &mut rng);
        let mut q = TextQueue::new();

        mc.on_event(ConnectionEvent::Connected, 1_000, &mut rng);
        q.enqueue(b"late");
        mc.on_event(ConnectionEvent::Disconnected, 2_000, &mut rng);

        assert_eq!(mc.mode(), Mode::MouseMover);
        assert_eq!(
            presented_mode(mc.mode(), q.depth()),
            PresentedMode::Bridge
        );
        assert!(!mover_may_fire(mc.mode(), q.depth()));

        while q.dequeue_one().is_some() {}
        assert_eq!(
            presented_mode(mc.mode(), q.depth()),
            PresentedMode::MouseMover
        );
        assert!(mover_may_fire(mc.mode(), q.depth()));
    }

    /// Discrete key events translate and count independently of the
    /// queue - a tap arriving mid-paste leaves the backlog untouched.
    #[test]
    fn discrete_tap_bypasses_queue() {
        let mut q = TextQueue::new();
        q.enqueue(b"0123456789");
        let depth_before = q.depth();

        let stats = Stats::new();
        let tap = translate(KeyEvent {
            modifiers: MOD_LSHIFT,
            keycode: 0x04,
        });
        assert!(tap.resolved());
        stats.record_key();

        assert_eq!(q.depth(), depth_before);
        assert_eq!(stats.key_count(), 1);
    }
}
