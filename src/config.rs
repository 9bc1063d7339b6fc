//! Application-wide constants and compile-time configuration.
//!
//! All timing parameters, queue sizing, and protocol constants live
//! here so they can be tuned in one place.

// Text queue

/// Capacity of the inbound text ring buffer in bytes.
///
/// One slot is always kept free to distinguish "empty" from "full",
/// so the usable capacity is `TEXT_QUEUE_CAPACITY - 1`.
pub const TEXT_QUEUE_CAPACITY: usize = 4096;

/// Minimum gap between two emitted characters (ms). 2 ms is slow
/// enough for every host we tested to keep up with a long paste.
pub const CHAR_INTERVAL_MS: u32 = 2;

// Mouse mover

/// Lower bound of the randomized inter-move delay (ms).
pub const MOVE_DELAY_MIN_MS: u32 = 7_000;

/// Upper bound of the randomized inter-move delay (ms), inclusive.
pub const MOVE_DELAY_MAX_MS: u32 = 60_000;

/// Settle time between the +1 and -1 halves of a mouse nudge (ms).
pub const NUDGE_SETTLE_MS: u64 = 20;

// BLE

/// GAP device name advertised to peers.
pub const BLE_DEVICE_NAME: &str = "KeyBridge";

/// ATT MTU to negotiate. 247 is the largest the S140 link layer
/// carries in a single PDU with data length extension.
pub const BLE_ATT_MTU: u16 = 247;

/// Delay before re-advertising after a peer disconnects (ms).
pub const ADV_RESTART_DELAY_MS: u64 = 500;

// USB

/// USB VID/PID - use the "pid.codes" open-source test VID.
/// Replace with your own allocated VID/PID for production.
pub const USB_VID: u16 = 0x1209;
pub const USB_PID: u16 = 0x0002;

/// USB device strings.
pub const USB_MANUFACTURER: &str = "keybridge";
pub const USB_PRODUCT: &str = "KeyBridge Mouse Mover";
pub const USB_SERIAL_NUMBER: &str = "000001";

/// USB HID polling interval (ms). 1 ms = 1000 Hz for lowest latency.
pub const USB_HID_POLL_MS: u8 = 1;

// UI

/// Display refresh cadence (ms).
pub const DISPLAY_TICK_MS: u32 = 50;

// GPIO pin assignments (nRF52840-DK defaults)
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   I²C SDA        → P0.26
//   I²C SCL        → P0.27
//   Status LED     → P0.06
