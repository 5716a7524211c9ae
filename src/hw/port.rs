// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Batched digital output port.
//!
//! The stepper energizes several windings at once, so outputs are addressed by bit number inside a
//! single 32-bit port word and written as one masked batch. Outputs that are wired to a timer
//! channel can additionally be switched between plain digital drive and the timer's fixed-duty
//! PWM drive.

/// Function an output is driven by.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Drive {
    /// Plain push-pull output, level set by [`OutputPort::write_masked`].
    Digital,
    /// Driven by the hardware PWM generator at its configured duty cycle.
    Pwm,
}

/// Highest output number addressable by a 32-bit port word.
pub const MAX_OUTPUT: u8 = 31;

pub trait OutputPort {
    /// Take ownership of an output: configure it as a digital output driven low.
    fn claim(&mut self, output: u8);

    /// Return an output to its reset state.
    fn release(&mut self, output: u8);

    /// Set every output in `mask` to the matching bit of `value`, in one write.
    fn write_masked(&mut self, mask: u32, value: u32);

    /// Switch an output between plain digital and PWM drive.
    fn set_drive(&mut self, output: u8, drive: Drive);
}

impl<T: OutputPort + ?Sized> OutputPort for &mut T {
    fn claim(&mut self, output: u8) {
        (**self).claim(output)
    }

    fn release(&mut self, output: u8) {
        (**self).release(output)
    }

    fn write_masked(&mut self, mask: u32, value: u32) {
        (**self).write_masked(mask, value)
    }

    fn set_drive(&mut self, output: u8, drive: Drive) {
        (**self).set_drive(output, drive)
    }
}

/// In-memory port that records output state, for host-side simulation and tests.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct SimPort {
    /// Outputs currently claimed.
    pub claimed: u32,
    /// Digital output levels.
    pub level: u32,
    /// Outputs currently switched to PWM drive.
    pub pwm: u32,
    /// Number of batched writes performed.
    pub writes: u32,
}

impl SimPort {
    pub const fn new() -> Self {
        Self {
            claimed: 0,
            level: 0,
            pwm: 0,
            writes: 0,
        }
    }

    /// Outputs that are currently delivering current, either by level or by PWM.
    #[inline]
    pub fn energized(&self) -> u32 {
        (self.level | self.pwm) & self.claimed
    }
}

impl OutputPort for SimPort {
    fn claim(&mut self, output: u8) {
        let bit = 1 << output;
        self.claimed |= bit;
        self.level &= !bit;
        self.pwm &= !bit;
    }

    fn release(&mut self, output: u8) {
        let bit = !(1 << output);
        self.claimed &= bit;
        self.level &= bit;
        self.pwm &= bit;
    }

    fn write_masked(&mut self, mask: u32, value: u32) {
        self.level = (self.level & !mask) | (value & mask);
        self.writes += 1;
    }

    fn set_drive(&mut self, output: u8, drive: Drive) {
        match drive {
            Drive::Digital => self.pwm &= !(1 << output),
            Drive::Pwm => self.pwm |= 1 << output,
        }
    }
}
