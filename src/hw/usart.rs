// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! USART debug console.
//!
//! Wraps the transmit half of any serial port and prints text to an attached debug terminal.
//!
//! Note: When using `writeln!`, be sure to include `\r` (CR) in the format string to ensure correct
//! line endings on the terminal.
//!
//! To access the terminal on the host machine, connect to the debug USB port and use
//! ```text
//! $ screen /dev/tty.usbmodem* 115200
//! ```
//!
//! To close the debug terminal, press `Ctrl+A` then `Ctrl+\` then `y`.

use core::fmt;

use embedded_hal::serial::Write;
use nb::block;

pub struct Usart<TX: Write<u8>> {
    tx: TX,
}

impl<TX: Write<u8>> Usart<TX> {
    pub fn new(tx: TX) -> Self {
        Self { tx }
    }

    #[inline]
    pub fn write_byte(&mut self, b: u8) {
        let _ = block!(self.tx.write(b));
    }

    pub fn write_str(&mut self, s: &str) {
        for &b in s.as_bytes() {
            self.write_byte(b);
        }
    }

    /// Write string and CRLF terminator.
    #[inline]
    pub fn println(&mut self, s: &str) {
        self.write_str(s);
        self.write_str("\r\n");
    }

    /// Block until the transmitter has drained.
    #[inline]
    pub fn flush(&mut self) {
        let _ = block!(self.tx.flush());
    }

    pub fn free(self) -> TX {
        self.tx
    }
}

// Implement `core::fmt::Write` so we can use `write!` / `writeln!` on `Usart`.
impl<TX: Write<u8>> fmt::Write for Usart<TX> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        Usart::write_str(self, s);
        Ok(())
    }
}

/// Change the bit rate of USART2 in place, after its transmitter has been split off.
///
/// Call only once the transmitter is idle (flushed). Assumes 16x oversampling on PCLK1, the HAL's
/// defaults.
#[cfg(target_os = "none")]
pub fn retune_usart2(clocks: &stm32f7xx_hal::rcc::Clocks, bps: u32) {
    use stm32f7xx_hal::pac;

    let usart = unsafe { &*pac::USART2::ptr() };
    let brr = clocks.pclk1().raw() / bps.max(1);

    // BRR is only writable while the USART is disabled
    usart.cr1.modify(|_, w| w.ue().clear_bit());
    usart.brr.write(|w| unsafe { w.bits(brr) });
    usart.cr1.modify(|_, w| w.ue().set_bit());
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use core::fmt::Write as _;
    use std::vec::Vec;

    #[derive(Default)]
    struct Capture(Vec<u8>);

    impl Write<u8> for Capture {
        type Error = Infallible;

        fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
            self.0.push(word);
            Ok(())
        }

        fn flush(&mut self) -> nb::Result<(), Infallible> {
            Ok(())
        }
    }

    #[test]
    fn println_ends_with_crlf() {
        let mut u = Usart::new(Capture::default());
        u.println("Booting...");
        write!(u, "RPM {}\r\n", 5).unwrap();
        assert_eq!(u.free().0, b"Booting...\r\nRPM 5\r\n");
    }
}
