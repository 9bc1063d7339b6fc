//! User interface subsystem - SSD1306 OLED status screens.
//!
//! The display is a passive consumer: once per tick the main loop
//! captures a [`crate::status::StatusSnapshot`] and the renderer draws
//! whichever screen the presented mode selects.  Nothing flows back.

#[cfg(feature = "embedded")]
pub mod display;
pub mod format;
