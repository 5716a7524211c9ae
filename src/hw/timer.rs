// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Free-running microsecond timer on TIM2.
//!
//! TIM2 is a 32-bit counter ticking at 1 MHz, so it wraps roughly every 71.6 minutes.
//! [`WrapCounter`] extends it to 64 bits; this only needs the counter to be read at least once per
//! wrap period, which the main loop does many thousands of times a second.

use core::cell::Cell;

/// Extends a wrapping 32-bit counter to 64 bits.
#[derive(Debug, Default)]
pub struct WrapCounter {
    last: Cell<u32>,
    high: Cell<u64>,
}

impl WrapCounter {
    pub const fn new() -> Self {
        Self {
            last: Cell::new(0),
            high: Cell::new(0),
        }
    }

    /// Feed a fresh raw reading and return the extended value.
    pub fn extend(&self, raw: u32) -> u64 {
        if raw < self.last.get() {
            self.high.set(self.high.get() + (1 << 32));
        }
        self.last.set(raw);
        self.high.get() | raw as u64
    }
}

#[cfg(target_os = "none")]
pub use self::tim2::MicrosTimer;

#[cfg(target_os = "none")]
mod tim2 {
    use stm32f7xx_hal::{pac, rcc::Clocks};

    use super::WrapCounter;
    use crate::hw::clock::Monotonic;

    pub struct MicrosTimer {
        tim: pac::TIM2,
        counter: WrapCounter,
    }

    impl MicrosTimer {
        /// Start TIM2 counting microseconds from zero.
        pub fn tim2(tim2: pac::TIM2, clocks: &Clocks) -> Self {
            let rcc = unsafe { &*pac::RCC::ptr() };
            rcc.apb1enr.modify(|_, w| w.tim2en().set_bit());

            let tim = tim2;
            let psc = (clocks.timclk1().raw() / 1_000_000).max(1) - 1;

            // Disable counter while configuring
            tim.cr1.modify(|_, w| w.cen().clear_bit());

            tim.psc.write(|w| unsafe { w.bits(psc) });
            tim.arr.write(|w| unsafe { w.bits(0xFFFF_FFFF) });

            // Load the prescaler and reset the counter
            tim.egr.write(|w| w.ug().set_bit());
            tim.cnt.write(|w| unsafe { w.bits(0) });

            tim.cr1.modify(|_, w| w.cen().set_bit());

            Self {
                tim,
                counter: WrapCounter::new(),
            }
        }

        #[inline]
        pub fn free(self) -> pac::TIM2 {
            self.tim
        }
    }

    impl Monotonic for MicrosTimer {
        #[inline]
        fn now_us(&self) -> u64 {
            self.counter.extend(self.tim.cnt.read().bits())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extends_across_wraps() {
        let c = WrapCounter::new();
        assert_eq!(c.extend(10), 10);
        assert_eq!(c.extend(u32::MAX), u32::MAX as u64);
        assert_eq!(c.extend(5), (1 << 32) + 5);
        assert_eq!(c.extend(5), (1 << 32) + 5);
        assert_eq!(c.extend(2), (2 << 32) + 2);
    }
}
