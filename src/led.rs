//! Status LED.
//!
//! One GPIO LED, active-low (nRF52-DK wiring): steady on when the
//! device is ready in either mode, dipped off around each mouse nudge
//! as a momentary move indicator.

use embassy_nrf::gpio::{AnyPin, Level, Output, OutputDrive};

pub struct StatusLed {
    pin: Output<'static, AnyPin>,
}

impl StatusLed {
    /// Take ownership of the LED pin, initially off.
    pub fn new(pin: AnyPin) -> Self {
        Self {
            pin: Output::new(pin, Level::High, OutputDrive::Standard),
        }
    }

    pub fn on(&mut self) {
        self.pin.set_low();
    }

    pub fn off(&mut self) {
        self.pin.set_high();
    }
}
