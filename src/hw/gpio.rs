// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! GPIOD as a batched [`OutputPort`] for the stepper driver stage.
//!
//! Outputs are GPIOD pin numbers. Levels are written through BSRR, so a whole pattern lands in a
//! single store; drive switching flips MODER between general-purpose output and the alternate
//! function (TIM4) the pin was configured for at bring-up.

use stm32f7xx_hal::pac;

use crate::hw::pins::DriverPins;
use crate::hw::port::{Drive, OutputPort};

const PIN_COUNT: u8 = 16;

// MODER field values
const MODE_INPUT: u32 = 0b00;
const MODE_OUTPUT: u32 = 0b01;
const MODE_ALTERNATE: u32 = 0b10;

pub struct DriverPort {
    /// Held so no one else can reconfigure the driver pins.
    _pins: DriverPins,
    claimed: u16,
}

impl DriverPort {
    pub fn new(pins: DriverPins) -> Self {
        Self {
            _pins: pins,
            claimed: 0,
        }
    }

    fn set_mode(&mut self, output: u8, mode: u32) {
        if output >= PIN_COUNT {
            return;
        }
        let gpio = unsafe { &*pac::GPIOD::ptr() };
        let shift = 2 * output as u32;
        gpio.moder
            .modify(|r, w| unsafe { w.bits((r.bits() & !(0b11 << shift)) | (mode << shift)) });
    }
}

impl OutputPort for DriverPort {
    fn claim(&mut self, output: u8) {
        if output >= PIN_COUNT {
            return;
        }
        self.claimed |= 1 << output;
        self.write_masked(1 << output, 0);
        self.set_mode(output, MODE_OUTPUT);
    }

    fn release(&mut self, output: u8) {
        if output >= PIN_COUNT {
            return;
        }
        self.write_masked(1 << output, 0);
        self.set_mode(output, MODE_INPUT);
        self.claimed &= !(1 << output);
    }

    fn write_masked(&mut self, mask: u32, value: u32) {
        let mask = mask & self.claimed as u32;
        if mask == 0 {
            return;
        }
        let set = value & mask;
        let reset = !value & mask;

        let gpio = unsafe { &*pac::GPIOD::ptr() };
        gpio.bsrr.write(|w| unsafe { w.bits(set | (reset << 16)) });
    }

    fn set_drive(&mut self, output: u8, drive: Drive) {
        if output >= PIN_COUNT || self.claimed & (1 << output) == 0 {
            return;
        }
        match drive {
            Drive::Digital => self.set_mode(output, MODE_OUTPUT),
            Drive::Pwm => self.set_mode(output, MODE_ALTERNATE),
        }
    }
}
