//! Unified error type for keybridge.
//!
//! We avoid `alloc` - all variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.
//!
//! None of these are fatal: the device runs unattended, so every error
//! is logged and locally recovered (or silently dropped where the wire
//! protocol has no way to report it back to the peer).

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Discrete-key write shorter than the 2-byte (modifiers, keycode) frame.
    ShortKeyPayload { len: usize },

    /// Keycode with neither a named-key nor a printable mapping.
    UnmappedKeycode(u8),

    /// USB HID endpoint write failed (host stalled or bus suspended).
    UsbWrite,
}
