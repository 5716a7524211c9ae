// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Bounded-acceleration ramp for a step interval.
//!
//! The ramp moves the interval currently applied by the step clock toward a requested interval by
//! at most one microsecond per `unit_us` microseconds of wall time. It is polled at whatever cadence
//! the main loop runs; whole units are consumed and the remainder carries over to the next poll, so
//! the ramp rate does not drift with poll timing.
//!
//! A shorter interval is a higher speed, so "accelerating" shrinks the interval and "decelerating"
//! grows it.
//!
//! Works in `no_std` and does not allocate memory.

/// Where the ramp is relative to its target.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RampState {
    /// Not stepping and nothing requested.
    Stopped,
    /// Speed rising toward the target (interval shrinking, or launching from stop).
    Accelerating,
    /// Interval equals the nonzero target.
    Steady,
    /// Speed falling toward the target, or toward the floor when stopping.
    Decelerating,
}

/// Ramp controller state and configuration.
#[derive(Clone, Debug)]
pub struct Ramp {
    /// Wall time per 1 µs change of interval. Zero disables ramping.
    unit_us: u64,
    /// Slowest interval while ramping. Launches start here and stops end here.
    floor_us: u64,

    /// Interval currently applied. Zero means not stepping.
    interval_us: u64,
    /// Time up to which whole units have been consumed.
    last_update_us: u64,
}

impl Default for Ramp {
    fn default() -> Self {
        Self::new()
    }
}

impl Ramp {
    /// Create a disabled ramp (speed changes apply instantly).
    pub const fn new() -> Self {
        Self {
            unit_us: 0,
            floor_us: 0,
            interval_us: 0,
            last_update_us: 0,
        }
    }

    /// Enable ramping with the given rate and floor interval.
    pub fn configure(&mut self, unit_us: u64, floor_us: u64) {
        self.unit_us = unit_us.max(1);
        self.floor_us = floor_us.max(1);
    }

    /// Disable ramping; the next update jumps straight to the target.
    pub fn disable(&mut self) {
        self.unit_us = 0;
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.unit_us != 0
    }

    #[inline]
    pub fn unit_us(&self) -> u64 {
        self.unit_us
    }

    #[inline]
    pub fn floor_us(&self) -> u64 {
        self.floor_us
    }

    /// Interval currently applied.
    #[inline]
    pub fn interval_us(&self) -> u64 {
        self.interval_us
    }

    /// Restart unit accounting from `now_us`, dropping any carried remainder.
    #[inline]
    pub fn restart(&mut self, now_us: u64) {
        self.last_update_us = now_us;
    }

    /// Drop the applied interval to zero without ramping down.
    #[inline]
    pub fn stop(&mut self) {
        self.interval_us = 0;
    }

    /// Classify the ramp against a target interval.
    pub fn state(&self, target_us: u64) -> RampState {
        let current = self.interval_us;
        if current == 0 && target_us == 0 {
            RampState::Stopped
        } else if current == target_us {
            RampState::Steady
        } else if target_us == 0 {
            RampState::Decelerating
        } else if current == 0 || current > target_us {
            RampState::Accelerating
        } else {
            RampState::Decelerating
        }
    }

    /// Advance the ramp toward `target_us` and return the interval to apply.
    pub fn update(&mut self, target_us: u64, now_us: u64) -> u64 {
        if !self.is_enabled() {
            self.interval_us = target_us;
            return self.interval_us;
        }

        match self.state(target_us) {
            RampState::Stopped => {}

            // Reached the floor on the way down: stop stepping.
            RampState::Decelerating if target_us == 0 && self.interval_us == self.floor_us => {
                self.interval_us = 0;
            }

            // Launch from the floor rather than from an infinite interval.
            RampState::Accelerating if self.interval_us == 0 => {
                self.interval_us = self.floor_us;
            }

            RampState::Accelerating | RampState::Steady | RampState::Decelerating => {
                self.advance(target_us, now_us);
            }
        }

        self.interval_us
    }

    fn advance(&mut self, target_us: u64, now_us: u64) {
        if now_us < self.last_update_us {
            return;
        }

        let units = (now_us - self.last_update_us) / self.unit_us;
        let goal = if target_us == 0 {
            self.floor_us
        } else {
            target_us
        };

        if self.interval_us < goal {
            self.interval_us = (self.interval_us + units).min(goal);
        } else if self.interval_us > goal {
            self.interval_us = self.interval_us.saturating_sub(units).max(goal);
        }

        self.last_update_us += self.unit_us * units;
    }
}
