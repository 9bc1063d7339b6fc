//! Protocol keystroke translation.
//!
//! The desktop peer sends `(modifiers, keycode)` pairs using standard
//! USB HID usage codes.  Translation resolves the primary key in two
//! steps: the named-key table (arrows, navigation cluster, function
//! keys, Escape, Caps Lock) takes precedence, then the printable-ASCII
//! layout with the shift substitution applied.  Unresolvable keycodes
//! leave the modifiers to be tapped on their own.
//!
//! Everything here is a discrete tap - press immediately followed by a
//! full release.  Key repeat and held keys are not modeled.

use crate::error::Error;
use crate::hid::keyboard::KeyboardReport;

// HID modifier bits (byte 0 of the boot keyboard report).
pub const MOD_LCTRL: u8 = 0x01;
pub const MOD_LSHIFT: u8 = 0x02;
pub const MOD_LALT: u8 = 0x04;
pub const MOD_LGUI: u8 = 0x08;
pub const MOD_RCTRL: u8 = 0x10;
pub const MOD_RSHIFT: u8 = 0x20;
pub const MOD_RALT: u8 = 0x40;
pub const MOD_RGUI: u8 = 0x80;

/// One discrete key event off the wire.  Ephemeral - translated and
/// emitted immediately, never queued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyEvent {
    pub modifiers: u8,
    pub keycode: u8,
}

impl KeyEvent {
    /// Parse the 2-byte characteristic payload.  Extra bytes are
    /// ignored; short payloads are rejected.
    pub fn parse(payload: &[u8]) -> Result<Self, Error> {
        if payload.len() < 2 {
            return Err(Error::ShortKeyPayload {
                len: payload.len(),
            });
        }
        Ok(Self {
            modifiers: payload[0],
            keycode: payload[1],
        })
    }
}

/// Resolved primary key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyPress {
    /// Named key; the usage code passes through to the report as-is.
    Named(u8),
    /// Printable character after shift substitution (`'A'`, `'!'`, …).
    Char(u8),
}

/// A fully translated tap: collapsed modifier bits plus an optional
/// primary key.  `press == None` still taps the modifiers alone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyTap {
    pub modifiers: u8,
    pub press: Option<KeyPress>,
}

impl KeyTap {
    /// True when a primary key resolved - the condition for counting
    /// the event as a keystroke.
    pub fn resolved(&self) -> bool {
        self.press.is_some()
    }

    /// The character this tap types, if it is a printable one.
    pub fn as_char(&self) -> Option<char> {
        match self.press {
            Some(KeyPress::Char(c)) => Some(c as char),
            _ => None,
        }
    }

    /// Build the press half of the tap.  The release half is always
    /// [`KeyboardReport::RELEASE`].
    pub fn press_report(&self) -> KeyboardReport {
        match self.press {
            Some(KeyPress::Named(code)) => KeyboardReport::press(self.modifiers, code),
            Some(KeyPress::Char(c)) => match ascii_to_keycode(c) {
                Some((code, shifted)) => {
                    let extra = if shifted { MOD_LSHIFT } else { 0 };
                    KeyboardReport::press(self.modifiers | extra, code)
                }
                None => KeyboardReport::press(self.modifiers, 0),
            },
            None => KeyboardReport::press(self.modifiers, 0),
        }
    }
}

/// Translate one wire event into a tap.
pub fn translate(event: KeyEvent) -> KeyTap {
    let shift = event.modifiers & (MOD_LSHIFT | MOD_RSHIFT) != 0;
    let press = if is_named_key(event.keycode) {
        Some(KeyPress::Named(event.keycode))
    } else {
        keycode_to_ascii(event.keycode, shift).map(KeyPress::Char)
    };
    KeyTap {
        modifiers: collapse_modifiers(event.modifiers),
        press,
    }
}

/// Press/release report pair for one character drained off the text
/// queue.  `None` for bytes with no key mapping (the queue filter
/// normally keeps those out).
pub fn char_reports(c: u8) -> Option<(KeyboardReport, KeyboardReport)> {
    let (code, shifted) = ascii_to_keycode(c)?;
    let modifier = if shifted { MOD_LSHIFT } else { 0 };
    Some((KeyboardReport::press(modifier, code), KeyboardReport::RELEASE))
}

/// Fold left/right modifier pairs onto the left-side bits.  The host
/// cannot tell the sides apart for a synthetic tap, and collapsing
/// keeps the emitted reports canonical.
pub fn collapse_modifiers(m: u8) -> u8 {
    let mut out = 0;
    if m & (MOD_LCTRL | MOD_RCTRL) != 0 {
        out |= MOD_LCTRL;
    }
    if m & (MOD_LSHIFT | MOD_RSHIFT) != 0 {
        out |= MOD_LSHIFT;
    }
    if m & (MOD_LALT | MOD_RALT) != 0 {
        out |= MOD_LALT;
    }
    if m & (MOD_LGUI | MOD_RGUI) != 0 {
        out |= MOD_LGUI;
    }
    out
}

/// Named keys that resolve ahead of the printable layout: Escape,
/// Caps Lock, F1-F12, the navigation cluster, and the arrows.
pub fn is_named_key(keycode: u8) -> bool {
    matches!(keycode, 0x29 | 0x39 | 0x3A..=0x45 | 0x49..=0x52)
}

/// Printable character for a keycode under the standard US layout,
/// with the shift substitution applied.
pub fn keycode_to_ascii(keycode: u8, shift: bool) -> Option<u8> {
    // Letters a-z.
    if (0x04..=0x1D).contains(&keycode) {
        let c = b'a' + (keycode - 0x04);
        return Some(if shift { c - 0x20 } else { c });
    }
    // Digits 1-9.
    if (0x1E..=0x26).contains(&keycode) {
        if shift {
            return Some(b"!@#$%^&*("[(keycode - 0x1E) as usize]);
        }
        return Some(b'1' + (keycode - 0x1E));
    }

    let pair = |plain, shifted| Some(if shift { shifted } else { plain });
    match keycode {
        0x27 => pair(b'0', b')'),
        0x28 => Some(b'\n'), // Enter
        0x2A => Some(0x08),  // Backspace
        0x2B => Some(b'\t'), // Tab
        0x2C => Some(b' '),  // Space
        0x2D => pair(b'-', b'_'),
        0x2E => pair(b'=', b'+'),
        0x2F => pair(b'[', b'{'),
        0x30 => pair(b']', b'}'),
        0x31 => pair(b'\\', b'|'),
        0x33 => pair(b';', b':'),
        0x34 => pair(b'\'', b'"'),
        0x35 => pair(b'`', b'~'),
        0x36 => pair(b',', b'<'),
        0x37 => pair(b'.', b'>'),
        0x38 => pair(b'/', b'?'),
        _ => None,
    }
}

/// Reverse lookup: keycode plus required-shift flag for a byte.  Used
/// when draining the text queue into keyboard reports.
pub fn ascii_to_keycode(c: u8) -> Option<(u8, bool)> {
    let code = match c {
        b'a'..=b'z' => (0x04 + (c - b'a'), false),
        b'A'..=b'Z' => (0x04 + (c - b'A'), true),
        b'1'..=b'9' => (0x1E + (c - b'1'), false),
        b'0' => (0x27, false),
        b'\n' => (0x28, false),
        0x08 => (0x2A, false),
        b'\t' => (0x2B, false),
        b' ' => (0x2C, false),
        b'-' => (0x2D, false),
        b'_' => (0x2D, true),
        b'=' => (0x2E, false),
        b'+' => (0x2E, true),
        b'[' => (0x2F, false),
        b'{' => (0x2F, true),
        b']' => (0x30, false),
        b'}' => (0x30, true),
        b'\\' => (0x31, false),
        b'|' => (0x31, true),
        b';' => (0x33, false),
        b':' => (0x33, true),
        b'\'' => (0x34, false),
        b'"' => (0x34, true),
        b'`' => (0x35, false),
        b'~' => (0x35, true),
        b',' => (0x36, false),
        b'<' => (0x36, true),
        b'.' => (0x37, false),
        b'>' => (0x37, true),
        b'/' => (0x38, false),
        b'?' => (0x38, true),
        b'!' => (0x1E, true),
        b'@' => (0x1F, true),
        b'#' => (0x20, true),
        b'$' => (0x21, true),
        b'%' => (0x22, true),
        b'^' => (0x23, true),
        b'&' => (0x24, true),
        b'*' => (0x25, true),
        b'(' => (0x26, true),
        b')' => (0x27, true),
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_requires_two_bytes() {
        assert_eq!(
            KeyEvent::parse(&[]),
            Err(Error::ShortKeyPayload { len: 0 })
        );
        assert_eq!(
            KeyEvent::parse(&[0x02]),
            Err(Error::ShortKeyPayload { len: 1 })
        );
        let ev = KeyEvent::parse(&[0x02, 0x04]).unwrap();
        assert_eq!(ev.modifiers, 0x02);
        assert_eq!(ev.keycode, 0x04);
        // Trailing bytes are ignored.
        assert!(KeyEvent::parse(&[0x00, 0x04, 0xFF]).is_ok());
    }

    #[test]
    fn shifted_letter_resolves_uppercase() {
        let tap = translate(KeyEvent {
            modifiers: MOD_LSHIFT,
            keycode: 0x04,
        });
        assert_eq!(tap.as_char(), Some('A'));
        assert!(tap.resolved());
        let report = tap.press_report();
        assert_eq!(report.modifier, MOD_LSHIFT);
        assert_eq!(report.keycodes[0], 0x04);
    }

    #[test]
    fn plain_letter_resolves_lowercase() {
        let tap = translate(KeyEvent {
            modifiers: 0,
            keycode: 0x07,
        });
        assert_eq!(tap.as_char(), Some('d'));
        assert_eq!(tap.press_report(), KeyboardReport::press(0, 0x07));
    }

    #[test]
    fn named_key_takes_precedence() {
        // 0x52 = Up Arrow: no printable mapping may hijack it.
        let tap = translate(KeyEvent {
            modifiers: 0,
            keycode: 0x52,
        });
        assert_eq!(tap.press, Some(KeyPress::Named(0x52)));
        assert_eq!(tap.press_report().keycodes[0], 0x52);

        for code in [0x29, 0x39, 0x3A, 0x45, 0x49, 0x4E, 0x4F] {
            assert!(is_named_key(code));
        }
        assert!(!is_named_key(0x04));
        assert!(!is_named_key(0x28)); // Enter goes through the char path
    }

    #[test]
    fn unmapped_keycode_leaves_modifiers_only() {
        let tap = translate(KeyEvent {
            modifiers: MOD_LCTRL,
            keycode: 0xEE,
        });
        assert!(!tap.resolved());
        let report = tap.press_report();
        assert_eq!(report.modifier, MOD_LCTRL);
        assert_eq!(report.keycodes[0], 0);
    }

    #[test]
    fn right_side_modifiers_collapse_left() {
        assert_eq!(collapse_modifiers(MOD_RCTRL), MOD_LCTRL);
        assert_eq!(collapse_modifiers(MOD_RSHIFT | MOD_RGUI), MOD_LSHIFT | MOD_LGUI);
        assert_eq!(collapse_modifiers(MOD_LALT | MOD_RALT), MOD_LALT);
        assert_eq!(collapse_modifiers(0xFF), 0x0F);
        assert_eq!(collapse_modifiers(0), 0);
    }

    #[test]
    fn shifted_digits_become_symbols() {
        assert_eq!(keycode_to_ascii(0x1E, false), Some(b'1'));
        assert_eq!(keycode_to_ascii(0x1E, true), Some(b'!'));
        assert_eq!(keycode_to_ascii(0x26, true), Some(b'('));
        assert_eq!(keycode_to_ascii(0x27, false), Some(b'0'));
        assert_eq!(keycode_to_ascii(0x27, true), Some(b')'));
    }

    #[test]
    fn whitespace_and_editing_keys() {
        assert_eq!(keycode_to_ascii(0x28, false), Some(b'\n'));
        assert_eq!(keycode_to_ascii(0x2B, true), Some(b'\t')); // shift is moot
        assert_eq!(keycode_to_ascii(0x2C, false), Some(b' '));
        assert_eq!(keycode_to_ascii(0x2A, false), Some(0x08));
    }

    #[test]
    fn ascii_round_trips_through_the_layout() {
        // Every byte the queue filter admits (plus backspace) must map
        // to a keycode whose forward translation gives it back.
        for c in (0x20u8..=0x7E).chain([b'\n', b'\t', 0x08]) {
            let (code, shifted) = match ascii_to_keycode(c) {
                Some(p) => p,
                None => panic!("no keycode for {c:#04x}"),
            };
            assert_eq!(keycode_to_ascii(code, shifted), Some(c), "byte {c:#04x}");
        }
    }

    #[test]
    fn char_reports_tap_and_release() {
        let (press, release) = char_reports(b'H').unwrap();
        assert_eq!(press.modifier, MOD_LSHIFT);
        assert_eq!(press.keycodes[0], 0x0B);
        assert!(release.is_empty());

        let (press, _) = char_reports(b' ').unwrap();
        assert_eq!(press.modifier, 0);
        assert_eq!(press.keycodes[0], 0x2C);

        assert!(char_reports(0x01).is_none());
    }
}
