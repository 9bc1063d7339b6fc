//! USB subsystem - composite HID device (keyboard + mouse).

pub mod hid_device;
