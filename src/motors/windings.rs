// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Winding outputs and driver-stage enable.
//!
//! Maps each sequencer bit to one physical output and applies a combined pattern as a single
//! batched write. Windings on PWM-capable outputs are handed to the timer (fixed duty, set at board
//! bring-up) while energized and parked as low digital outputs while idle, so only energized
//! windings draw current.

use heapless::Vec;

use crate::hw::port::{Drive, OutputPort, MAX_OUTPUT};

/// Maximum number of windings per motor.
pub const MAX_WINDINGS: usize = 8;

/// One registered winding.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Winding {
    /// Output number on the port.
    pub output: u8,
    /// Whether the output can be switched to PWM drive.
    pub variable_drive: bool,
}

/// Reasons a winding cannot be registered.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WindingError {
    /// Already [`MAX_WINDINGS`] windings registered.
    CapacityExceeded,
    /// Output number does not fit in the port word.
    OutputOutOfRange,
    /// Output already used by another winding or the enable line.
    OutputInUse,
}

/// Ordered winding outputs plus the optional enable output, owning the port.
pub struct Windings<P: OutputPort> {
    port: P,
    windings: Vec<Winding, MAX_WINDINGS>,
    enable: Option<u8>,
}

impl<P: OutputPort> Windings<P> {
    /// Take the port and claim the enable output (driver stage starts disabled).
    ///
    /// An enable output beyond [`MAX_OUTPUT`] is ignored and the stage is treated as always
    /// enabled.
    pub fn new(mut port: P, enable: Option<u8>) -> Self {
        let enable = enable.filter(|&output| output <= MAX_OUTPUT);
        if let Some(output) = enable {
            port.claim(output);
            port.write_masked(1 << output, 0);
        }

        Self {
            port,
            windings: Vec::new(),
            enable,
        }
    }

    /// Append a winding; its position in the list is its sequencer bit.
    pub fn register(&mut self, output: u8, variable_drive: bool) -> Result<usize, WindingError> {
        if output > MAX_OUTPUT {
            return Err(WindingError::OutputOutOfRange);
        }
        if self.enable == Some(output) || self.windings.iter().any(|w| w.output == output) {
            return Err(WindingError::OutputInUse);
        }

        self.windings
            .push(Winding {
                output,
                variable_drive,
            })
            .map_err(|_| WindingError::CapacityExceeded)?;

        self.port.claim(output);
        self.port.write_masked(1 << output, 0);

        Ok(self.windings.len() - 1)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.windings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.windings.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Winding] {
        &self.windings
    }

    /// Energize exactly the windings whose bits are set in `pattern`.
    pub fn apply(&mut self, pattern: u32) {
        let mut mask = 0u32;
        let mut value = 0u32;

        for (bit, winding) in self.windings.iter().enumerate() {
            let out = 1u32 << winding.output;
            mask |= out;

            let active = (pattern >> bit) & 1 != 0;
            match (active, winding.variable_drive) {
                (true, true) => self.port.set_drive(winding.output, Drive::Pwm),
                (true, false) => value |= out,
                (false, true) => self.port.set_drive(winding.output, Drive::Digital),
                (false, false) => {}
            }
        }

        self.port.write_masked(mask, value);
    }

    /// Power or unpower the driver stage. No-op without an enable output.
    pub fn enable(&mut self, on: bool) {
        if let Some(output) = self.enable {
            let bit = 1u32 << output;
            self.port.write_masked(bit, if on { bit } else { 0 });
        }
    }

    #[inline]
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Release every claimed output and return the port.
    pub fn free(mut self) -> P {
        for winding in self.windings.iter() {
            if winding.variable_drive {
                self.port.set_drive(winding.output, Drive::Digital);
            }
            self.port.release(winding.output);
        }
        if let Some(output) = self.enable {
            self.port.release(output);
        }
        self.port
    }
}
