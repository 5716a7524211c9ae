// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Fixed-duty PWM on TIM4 for the winding outputs.
//!
//! All four channels run at one frequency and one duty cycle, set once at bring-up. Whether a
//! winding actually sees the PWM is decided per pin by `DriverPort`
//! switching its alternate function on and off.

/// Prescaler, auto-reload and compare values for one PWM setting.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PwmTiming {
    pub psc: u16,
    pub arr: u16,
    pub ccr: u16,
}

impl PwmTiming {
    /// Pick the finest resolution a 16-bit counter allows for `freq_hz` at `duty_percent`.
    pub fn new(timer_hz: u32, freq_hz: u32, duty_percent: u32) -> Self {
        let ticks = (timer_hz / freq_hz.max(1)).max(1);
        let psc = (ticks - 1) / 0x1_0000;
        let period = ticks / (psc + 1);
        let ccr = period as u64 * duty_percent.min(100) as u64 / 100;

        Self {
            psc: psc.min(u16::MAX as u32) as u16,
            arr: (period.saturating_sub(1)).min(u16::MAX as u32) as u16,
            ccr: ccr.min(u16::MAX as u64) as u16,
        }
    }
}

#[cfg(target_os = "none")]
pub use self::tim4::WindingPwm;

#[cfg(target_os = "none")]
mod tim4 {
    use stm32f7xx_hal::{pac, rcc::Clocks};

    use super::PwmTiming;

    /// TIM4 CH1..CH4 in PWM mode 1.
    pub struct WindingPwm {
        tim: pac::TIM4,
        timing: PwmTiming,
    }

    impl WindingPwm {
        pub fn tim4(tim4: pac::TIM4, clocks: &Clocks, freq_hz: u32, duty_percent: u32) -> Self {
            let rcc = unsafe { &*pac::RCC::ptr() };
            rcc.apb1enr.modify(|_, w| w.tim4en().set_bit());

            let timing = PwmTiming::new(clocks.timclk1().raw(), freq_hz, duty_percent);
            let tim = tim4;

            // Disable counter while configuring
            tim.cr1.modify(|_, w| w.cen().clear_bit());

            tim.psc.write(|w| unsafe { w.bits(timing.psc as u32) });
            tim.arr.write(|w| unsafe { w.bits(timing.arr as u32) });

            // OCxM = PWM mode 1, OCxPE = preload, for all four channels
            tim.ccmr1_output().write(|w| unsafe { w.bits(0x6868) });
            tim.ccmr2_output().write(|w| unsafe { w.bits(0x6868) });

            tim.ccr1.write(|w| unsafe { w.bits(timing.ccr as u32) });
            tim.ccr2.write(|w| unsafe { w.bits(timing.ccr as u32) });
            tim.ccr3.write(|w| unsafe { w.bits(timing.ccr as u32) });
            tim.ccr4.write(|w| unsafe { w.bits(timing.ccr as u32) });

            // CC1E..CC4E, active high
            tim.ccer.write(|w| unsafe { w.bits(0x1111) });

            // Load the preloaded registers, then start with auto-reload preload on
            tim.egr.write(|w| w.ug().set_bit());
            tim.cr1.modify(|_, w| w.arpe().set_bit().cen().set_bit());

            Self { tim, timing }
        }

        #[inline]
        pub fn timing(&self) -> PwmTiming {
            self.timing
        }

        #[inline]
        pub fn free(self) -> pac::TIM4 {
            self.tim
        }
    }
}
