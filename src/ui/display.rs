//! SSD1306 OLED display wrapper.
//!
//! Buffered-graphics mode: each draw call rebuilds the full frame and
//! flushes it, so screen switches need no explicit clearing logic.

use core::fmt::Write as _;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::MonoTextStyleBuilder;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::Text;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

use crate::status::StatusSnapshot;
use crate::ui::format::format_hms;
use crate::mode::PresentedMode;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn text_style() -> embedded_graphics::mono_font::MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

/// Render the boot splash.
pub fn draw_splash<I2C>(display: &mut Display<I2C>)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new("KeyBridge", Point::new(0, 10), text_style()).draw(display);
    let _ = Text::new("+ Mouse Mover", Point::new(0, 24), text_style()).draw(display);
    let _ = Text::new("Starting...", Point::new(0, 44), text_style()).draw(display);

    let _ = display.flush();
}

/// Render whichever screen the presented mode selects.
pub fn draw<I2C>(display: &mut Display<I2C>, snapshot: &StatusSnapshot)
where
    I2C: embedded_hal::i2c::I2c,
{
    match snapshot.presented {
        PresentedMode::MouseMover => draw_mover(display, snapshot),
        PresentedMode::Bridge => draw_bridge(display, snapshot),
    }
}

/// Mouse-mover screen: uptime, countdown, total moves.
fn draw_mover<I2C>(display: &mut Display<I2C>, snapshot: &StatusSnapshot)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new("Mouse Mover", Point::new(0, 10), text_style()).draw(display);

    let mut line: heapless::String<24> = heapless::String::new();
    let _ = write!(line, "Up {}", format_hms(snapshot.uptime_secs));
    let _ = Text::new(line.as_str(), Point::new(0, 26), text_style()).draw(display);

    line.clear();
    let _ = write!(line, "Next in {}s", snapshot.next_move_secs);
    let _ = Text::new(line.as_str(), Point::new(0, 40), text_style()).draw(display);

    line.clear();
    let _ = write!(line, "Moves {}", snapshot.move_count);
    let _ = Text::new(line.as_str(), Point::new(0, 54), text_style()).draw(display);

    let _ = display.flush();
}

/// Bridge screen: connection status, queue depth while draining,
/// total key count.
fn draw_bridge<I2C>(display: &mut Display<I2C>, snapshot: &StatusSnapshot)
where
    I2C: embedded_hal::i2c::I2c,
{
    display.clear_buffer();

    let _ = Text::new("KeyBridge", Point::new(0, 10), text_style()).draw(display);

    let status = if snapshot.connected {
        "Connected"
    } else {
        // Disconnected but a backlog is still typing out.
        "Draining"
    };
    let _ = Text::new(status, Point::new(0, 26), text_style()).draw(display);

    let mut line: heapless::String<24> = heapless::String::new();
    if snapshot.queue_depth > 0 {
        let _ = write!(line, "Q:{} K:{}", snapshot.queue_depth, snapshot.key_count);
    } else {
        let _ = write!(line, "Keys: {}", snapshot.key_count);
    }
    let _ = Text::new(line.as_str(), Point::new(0, 44), text_style()).draw(display);

    let _ = display.flush();
}
