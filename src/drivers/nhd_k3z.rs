// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Newhaven Display K3Z serial character LCD.
//!
//! The display is write-only: text bytes are shown at the cursor, and commands are introduced by a
//! `0xFE` prefix byte. Line 1 starts at cursor position `0x00`, line 2 at [`LINE_2`].
//!
//! The module powers up at 9600 baud. After [`NhdK3z::set_baud`] the UART driving it must be
//! reconfigured to the returned rate before anything else is sent.

use core::fmt;

use embedded_hal::serial::Write;
use nb::block;

/// Command prefix byte.
pub const PREFIX: u8 = 0xFE;

/// Cursor position of the first character of line 2.
pub const LINE_2: u8 = 0x40;

// Command codes
pub mod cmd {
    pub const DISPLAY_ON: u8 = 0x41;
    pub const DISPLAY_OFF: u8 = 0x42;
    pub const SET_CURSOR: u8 = 0x45;
    pub const HOME: u8 = 0x46;
    pub const UNDERLINE_ON: u8 = 0x47;
    pub const UNDERLINE_OFF: u8 = 0x48;
    pub const BLINK_ON: u8 = 0x4B;
    pub const BLINK_OFF: u8 = 0x4C;
    pub const CLEAR: u8 = 0x51;
    pub const CONTRAST: u8 = 0x52;
    pub const BRIGHTNESS: u8 = 0x53;
    pub const BAUD: u8 = 0x61;
}

pub const MAX_CONTRAST: u8 = 50;
pub const MAX_BRIGHTNESS: u8 = 8;

/// Supported UART rates, encoded as the module expects them.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum Baud {
    B300 = 1,
    B1200,
    B2400,
    B9600,
    B14400,
    B19200,
    B57600,
    B115200,
}

impl Baud {
    /// Bit rate in bits per second.
    pub const fn bps(self) -> u32 {
        match self {
            Baud::B300 => 300,
            Baud::B1200 => 1_200,
            Baud::B2400 => 2_400,
            Baud::B9600 => 9_600,
            Baud::B14400 => 14_400,
            Baud::B19200 => 19_200,
            Baud::B57600 => 57_600,
            Baud::B115200 => 115_200,
        }
    }
}

/// K3Z display driver over any byte-oriented serial transmitter.
///
/// Transmit errors are dropped: the display gives no feedback, and a glitched frame is repaired by
/// the next redraw.
pub struct NhdK3z<TX> {
    tx: TX,
}

impl<TX: Write<u8>> NhdK3z<TX> {
    pub fn new(tx: TX) -> Self {
        Self { tx }
    }

    pub fn free(self) -> TX {
        self.tx
    }

    #[inline]
    fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    fn write_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.write_byte(b);
        }
    }

    fn command(&mut self, code: u8) {
        self.write_bytes(&[PREFIX, code]);
    }

    fn command_arg(&mut self, code: u8, arg: u8) {
        self.write_bytes(&[PREFIX, code, arg]);
    }

    /// Show text at the cursor.
    pub fn write_str(&mut self, s: &str) {
        self.write_bytes(s.as_bytes());
    }

    /// Block until everything written has left the transmitter.
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    pub fn clear(&mut self) {
        self.command(cmd::CLEAR);
    }

    /// Move the cursor to the first position of line 1.
    pub fn home(&mut self) {
        self.command(cmd::HOME);
    }

    pub fn set_cursor(&mut self, pos: u8) {
        self.command_arg(cmd::SET_CURSOR, pos);
    }

    /// Set contrast, clamped to `1..=50`.
    pub fn set_contrast(&mut self, contrast: u8) {
        self.command_arg(cmd::CONTRAST, contrast.clamp(1, MAX_CONTRAST));
    }

    /// Set backlight brightness, clamped to `1..=8`.
    pub fn set_brightness(&mut self, brightness: u8) {
        self.command_arg(cmd::BRIGHTNESS, brightness.clamp(1, MAX_BRIGHTNESS));
    }

    pub fn set_cursor_blink(&mut self, blink: bool) {
        self.command(if blink { cmd::BLINK_ON } else { cmd::BLINK_OFF });
    }

    pub fn set_cursor_underline(&mut self, underline: bool) {
        self.command(if underline {
            cmd::UNDERLINE_ON
        } else {
            cmd::UNDERLINE_OFF
        });
    }

    pub fn set_display_on(&mut self, on: bool) {
        self.command(if on { cmd::DISPLAY_ON } else { cmd::DISPLAY_OFF });
    }

    /// Switch the module's UART rate. Flushes, then returns the new rate for the caller to apply.
    pub fn set_baud(&mut self, baud: Baud) -> u32 {
        self.command_arg(cmd::BAUD, baud as u8);
        self.flush();
        baud.bps()
    }
}

// Implement `core::fmt::Write` so we can use `write!` on the display.
impl<TX: Write<u8>> fmt::Write for NhdK3z<TX> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        NhdK3z::write_str(self, s);
        Ok(())
    }
}
