//! Bluetooth Low Energy subsystem.
//!
//! The device runs the SoftDevice S140 in **Peripheral** role: it
//! advertises one vendor-specific service and accepts exactly one
//! central (the desktop companion app) at a time.
//!
//! The service exposes two write-only characteristics:
//!
//! 1. **Text** - a UTF-8 byte sequence; filtered and admitted into the
//!    text queue, drained by the main loop at a fixed rate.
//! 2. **Discrete key** - a 2-byte `(modifiers, keycode)` frame;
//!    translated and emitted immediately from the write callback,
//!    bypassing the queue.
//!
//! Connect/disconnect transitions are funneled into the main loop via
//! an Embassy channel; the write callbacks themselves never block.

pub mod server;
