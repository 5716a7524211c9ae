// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Self-paced stepper motor.
//!
//! [`Stepper`] turns a target speed in rpm into winding patterns. It never blocks: the main loop
//! calls [`Stepper::poll`] as often as it can, and each poll reads the clock, lets the ramp pick
//! the current step interval, and takes at most one step if one is due.
//!
//! Typical usage pattern:
//!
//! ```ignore
//! let mut motor = Stepper::new(200, 60, DriveMode::HalfStep, Some(8), port, &timer);
//! for output in [0, 4, 2, 6] {
//!     motor.register_winding(output, true)?;
//! }
//! motor.configure_acceleration(60, 5);
//! motor.enable(true);
//! motor.hold();
//! motor.set_target_speed(30);
//!
//! loop {
//!     let tick = motor.poll();
//!     led.set(tick.behind);
//! }
//! ```
//!
//! Falling behind: when more than one interval has elapsed since the last step, the poll still
//! takes a single step and advances the step anchor by one interval, reporting `behind` so the
//! caller can flag the overload. The ramp, in contrast, consumes every elapsed unit in one poll.

use crate::control::ramp::{Ramp, RampState};
use crate::hw::clock::Monotonic;
use crate::hw::port::OutputPort;
use crate::motors::phase::{DriveMode, PhaseSequencer};
use crate::motors::windings::{WindingError, Windings};

const US_PER_SEC: u64 = 1_000_000;
const US_PER_MIN: u64 = 60 * US_PER_SEC;

/// Slowest speed accepted as a ramp floor.
pub const MIN_FLOOR_RPM: u32 = 1;

/// Result of one [`Stepper::poll`].
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tick {
    /// A step was taken.
    pub stepped: bool,
    /// More than one interval had elapsed; the step clock is behind schedule.
    pub behind: bool,
}

pub struct Stepper<P: OutputPort, C: Monotonic> {
    windings: Windings<P>,
    clock: C,
    phases: PhaseSequencer,
    ramp: Ramp,

    /// Micro-steps per revolution (doubled in half-step drive)
    steps_per_rev: u32,
    max_rpm: u32,

    target_rpm: u32,
    target_interval_us: u64,
    last_step_us: u64,
    step_count: u64,
}

impl<P: OutputPort, C: Monotonic> Stepper<P, C> {
    /// Create a motor with every winding off and the driver stage disabled.
    ///
    /// `steps_per_rev` is the motor's full-step count; half-step drive doubles it.
    pub fn new(
        steps_per_rev: u32,
        max_rpm: u32,
        mode: DriveMode,
        enable_output: Option<u8>,
        port: P,
        clock: C,
    ) -> Self {
        Self {
            windings: Windings::new(port, enable_output),
            clock,
            phases: PhaseSequencer::new(mode),
            ramp: Ramp::new(),
            steps_per_rev: steps_per_rev.max(1) * mode.resolution(),
            max_rpm,
            target_rpm: 0,
            target_interval_us: 0,
            last_step_us: 0,
            step_count: 0,
        }
    }

    /// Register the next winding. Call once per winding before first use; order defines the bit.
    pub fn register_winding(
        &mut self,
        output: u8,
        variable_drive: bool,
    ) -> Result<usize, WindingError> {
        self.windings.register(output, variable_drive)
    }

    /// Limit acceleration to `rpm_per_sec`, ramping from/to `min_rpm`. Zero disables ramping.
    pub fn configure_acceleration(&mut self, rpm_per_sec: u32, min_rpm: u32) {
        if rpm_per_sec == 0 {
            self.ramp.disable();
        } else {
            let unit = self.rpm_to_interval(rpm_per_sec as u64 * 60);
            let floor = self.rpm_to_interval(min_rpm.max(MIN_FLOOR_RPM) as u64);
            self.ramp.configure(unit, floor);
        }
    }

    /// Request a speed. Values above the maximum are clamped; repeating the current target is a
    /// no-op.
    pub fn set_target_speed(&mut self, rpm: u32) {
        let rpm = rpm.min(self.max_rpm);
        if rpm == self.target_rpm {
            return;
        }

        let now = self.clock.now_us();
        self.target_rpm = rpm;
        self.last_step_us = now;
        self.ramp.restart(now);
        self.target_interval_us = self.rpm_to_interval(rpm as u64);
    }

    /// Run the ramp and step clock once.
    pub fn poll(&mut self) -> Tick {
        let now = self.clock.now_us();
        let interval = self.ramp.update(self.target_interval_us, now);

        if interval == 0 || now < self.last_step_us {
            return Tick::default();
        }

        let due = (now - self.last_step_us) / interval;
        if due == 0 {
            return Tick::default();
        }

        let stepped = self.step(true);
        self.last_step_us += interval;

        Tick {
            stepped,
            behind: due > 1,
        }
    }

    /// Take one step immediately, outside the paced clock.
    pub fn step_once(&mut self, forward: bool) {
        self.step(forward);
        let now = self.clock.now_us();
        self.last_step_us = now;
        self.ramp.restart(now);
    }

    /// Energize the holding pattern (position held, no motion).
    pub fn hold(&mut self) {
        self.phases.hold();
        self.windings.apply(self.phases.pattern());
    }

    /// Stop at once and de-energize all windings (no holding torque).
    ///
    /// Bypasses the ramp: the target and the applied interval both drop to zero, so later polls
    /// take no steps until a new target speed is set.
    pub fn brake(&mut self) {
        self.target_rpm = 0;
        self.target_interval_us = 0;
        self.ramp.stop();
        self.phases.brake();
        self.windings.apply(self.phases.pattern());
    }

    /// Power or unpower the driver stage.
    #[inline]
    pub fn enable(&mut self, on: bool) {
        self.windings.enable(on);
    }

    /// Commanded speed (rpm).
    #[inline]
    pub fn target_speed(&self) -> u32 {
        self.target_rpm
    }

    /// Speed the ramp is currently applying (rpm), zero while stopped.
    pub fn effective_speed(&self) -> u32 {
        match self.ramp.interval_us() {
            0 => 0,
            interval => (US_PER_MIN / (interval * self.steps_per_rev as u64)) as u32,
        }
    }

    /// Steps taken since construction.
    #[inline]
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    #[inline]
    pub fn state(&self) -> RampState {
        self.ramp.state(self.target_interval_us)
    }

    /// Whether any winding is energized (held or stepping).
    #[inline]
    pub fn is_energized(&self) -> bool {
        self.phases.pattern() != 0
    }

    #[inline]
    pub fn mode(&self) -> DriveMode {
        self.phases.mode()
    }

    #[inline]
    pub fn steps_per_rev(&self) -> u32 {
        self.steps_per_rev
    }

    #[inline]
    pub fn max_speed(&self) -> u32 {
        self.max_rpm
    }

    /// Interval currently applied by the step clock (µs).
    #[inline]
    pub fn interval_us(&self) -> u64 {
        self.ramp.interval_us()
    }

    #[inline]
    pub fn phases(&self) -> &PhaseSequencer {
        &self.phases
    }

    #[inline]
    pub fn port(&self) -> &P {
        self.windings.port()
    }

    /// Time source pacing this motor.
    #[inline]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Release every claimed output and return the port and clock.
    pub fn free(self) -> (P, C) {
        (self.windings.free(), self.clock)
    }

    fn rpm_to_interval(&self, rpm: u64) -> u64 {
        if rpm == 0 {
            return 0;
        }
        (US_PER_MIN / (rpm * self.steps_per_rev as u64)).max(1)
    }

    /// Returns `false` when the windings were braked and only the holding pattern was restored.
    fn step(&mut self, forward: bool) -> bool {
        let width = self.windings.len() as u32;
        let stepped = self.phases.advance(self.step_count, forward, width);
        if stepped {
            self.step_count += 1;
        }
        self.windings.apply(self.phases.pattern());
        stepped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::clock::ManualClock;
    use crate::hw::port::SimPort;

    const OUTPUTS: [u8; 4] = [0, 4, 2, 6];

    fn motor(mode: DriveMode, clock: &ManualClock) -> Stepper<SimPort, &ManualClock> {
        let mut m = Stepper::new(200, 60, mode, Some(8), SimPort::new(), clock);
        for output in OUTPUTS {
            m.register_winding(output, true).unwrap();
        }
        m
    }

    /// Windings energized, as sequencer bits.
    fn bits(m: &Stepper<SimPort, &ManualClock>) -> u32 {
        let energized = m.port().energized();
        OUTPUTS
            .iter()
            .enumerate()
            .filter(|&(_, &o)| energized & (1 << o) != 0)
            .fold(0, |acc, (bit, _)| acc | (1 << bit))
    }

    #[test]
    fn half_step_doubles_resolution() {
        let clock = ManualClock::new(0);
        assert_eq!(motor(DriveMode::HalfStep, &clock).steps_per_rev(), 400);
        assert_eq!(motor(DriveMode::Wave, &clock).steps_per_rev(), 200);
    }

    #[test]
    fn hold_patterns_per_mode() {
        let clock = ManualClock::new(0);
        for (mode, want) in [
            (DriveMode::Wave, 0b0001),
            (DriveMode::DualPhase, 0b0011),
            (DriveMode::HalfStep, 0b0001),
        ] {
            let mut m = motor(mode, &clock);
            m.brake();
            assert_eq!(m.port().energized(), 0);
            m.hold();
            assert_eq!(bits(&m), want);
            m.step_once(true);
            m.brake();
            assert_eq!(m.port().energized(), 0);
            m.hold();
            assert_eq!(bits(&m), want);
        }
    }

    #[test]
    fn step_after_brake_holds_without_counting() {
        let clock = ManualClock::new(0);
        let mut m = motor(DriveMode::Wave, &clock);
        m.brake();
        m.step_once(true);
        assert_eq!(m.step_count(), 0);
        assert_eq!(bits(&m), 0b0001);
        m.step_once(true);
        assert_eq!(m.step_count(), 1);
        assert_eq!(bits(&m), 0b1000);
        m.step_once(false);
        assert_eq!(bits(&m), 0b0001);
    }

    #[test]
    fn brake_while_running_stops_stepping() {
        let clock = ManualClock::new(0);
        let mut m = motor(DriveMode::Wave, &clock);
        m.hold();
        m.set_target_speed(60);
        while m.step_count() < 10 {
            clock.advance(5_000);
            m.poll();
        }

        m.brake();
        assert_eq!(m.port().energized() & !(1 << 8), 0);
        assert_eq!(m.target_speed(), 0);
        assert_eq!(m.state(), RampState::Stopped);

        for _ in 0..10 {
            clock.advance(5_000);
            assert_eq!(m.poll(), Tick::default());
        }
        assert_eq!(m.step_count(), 10);
        assert_eq!(bits(&m), 0);
        assert_eq!(m.effective_speed(), 0);
    }

    #[test]
    fn braked_restart_reholds_before_stepping() {
        let clock = ManualClock::new(0);
        let mut m = motor(DriveMode::Wave, &clock);
        m.brake();
        m.set_target_speed(60);

        clock.advance(5_000);
        let tick = m.poll();
        assert!(!tick.stepped);
        assert_eq!(m.step_count(), 0);
        assert_eq!(bits(&m), 0b0001);

        clock.advance(5_000);
        assert!(m.poll().stepped);
        assert_eq!(m.step_count(), 1);
        assert_eq!(bits(&m), 0b1000);
    }

    #[test]
    fn speed_is_clamped_and_converted() {
        let clock = ManualClock::new(0);
        let mut m = motor(DriveMode::Wave, &clock);
        m.set_target_speed(500);
        assert_eq!(m.target_speed(), 60);
        m.poll();
        // 60 rpm * 200 steps = 200 steps/s
        assert_eq!(m.interval_us(), 5_000);
        assert_eq!(m.effective_speed(), 60);
    }

    #[test]
    fn stopped_motor_never_steps() {
        let clock = ManualClock::new(0);
        let mut m = motor(DriveMode::Wave, &clock);
        m.hold();
        clock.advance(10_000_000);
        assert_eq!(m.poll(), Tick::default());
        assert_eq!(m.effective_speed(), 0);
        assert_eq!(m.state(), RampState::Stopped);
    }

    #[test]
    fn falls_behind_one_step_per_poll() {
        let clock = ManualClock::new(1_000);
        let mut m = motor(DriveMode::Wave, &clock);
        m.hold();
        m.set_target_speed(60);

        clock.advance(5 * 5_000);
        for i in 0..5 {
            let tick = m.poll();
            assert!(tick.stepped, "poll {} took no step", i);
            assert_eq!(tick.behind, i < 4, "poll {}", i);
        }
        assert_eq!(m.step_count(), 5);
        assert!(!m.poll().stepped);
    }

    #[test]
    fn step_once_resets_step_clock() {
        let clock = ManualClock::new(0);
        let mut m = motor(DriveMode::Wave, &clock);
        m.hold();
        m.set_target_speed(60);
        clock.advance(4_000);
        m.step_once(false);
        clock.advance(4_000);
        assert!(!m.poll().stepped);
        clock.advance(1_000);
        assert!(m.poll().stepped);
    }

    #[test]
    fn repeated_target_is_idempotent() {
        let clock_a = ManualClock::new(0);
        let clock_b = ManualClock::new(0);
        let mut a = motor(DriveMode::HalfStep, &clock_a);
        let mut b = motor(DriveMode::HalfStep, &clock_b);
        a.configure_acceleration(60, 5);
        b.configure_acceleration(60, 5);

        a.set_target_speed(30);
        b.set_target_speed(30);
        for n in 0..20_000 {
            clock_a.advance(100);
            clock_b.advance(100);
            if n == 500 {
                b.set_target_speed(30);
            }
            assert_eq!(a.poll(), b.poll());
            assert_eq!(a.interval_us(), b.interval_us());
        }
        assert_eq!(a.step_count(), b.step_count());
    }

    #[test]
    fn zero_acceleration_changes_speed_instantly() {
        let clock = ManualClock::new(0);
        let mut m = motor(DriveMode::Wave, &clock);
        m.configure_acceleration(60, 5);
        m.configure_acceleration(0, 5);
        m.set_target_speed(30);
        m.poll();
        assert_eq!(m.effective_speed(), 30);
        m.set_target_speed(0);
        m.poll();
        assert_eq!(m.effective_speed(), 0);
    }

    #[test]
    fn ramps_up_monotonically_without_overshoot() {
        for target in [5, 17, 30, 60] {
            let clock = ManualClock::new(0);
            let mut m = motor(DriveMode::HalfStep, &clock);
            m.configure_acceleration(60, 5);
            m.hold();
            m.set_target_speed(target);

            let mut last = 0;
            for _ in 0..40_000 {
                clock.advance(50);
                m.poll();
                let speed = m.effective_speed();
                assert!(speed >= last, "speed fell while ramping to {}", target);
                assert!(speed <= target, "overshot {}", target);
                last = speed;
            }
            assert_eq!(last, target);
            assert_eq!(m.state(), RampState::Steady);
        }
    }

    #[test]
    fn stopping_decelerates_before_zero() {
        let clock = ManualClock::new(0);
        let mut m = motor(DriveMode::HalfStep, &clock);
        m.configure_acceleration(60, 5);
        m.set_target_speed(60);
        for _ in 0..30_000 {
            clock.advance(50);
            m.poll();
        }
        assert_eq!(m.effective_speed(), 60);

        m.set_target_speed(0);
        m.poll();
        assert_eq!(m.state(), RampState::Decelerating);
        assert_ne!(m.effective_speed(), 0);

        let mut last = m.interval_us();
        while m.interval_us() != 0 {
            clock.advance(50);
            m.poll();
            if m.interval_us() != 0 {
                assert!(m.interval_us() >= last);
                last = m.interval_us();
            }
        }
        assert_eq!(last, 30_000);
        assert_eq!(m.state(), RampState::Stopped);
    }

    #[test]
    fn polling_without_windings_is_safe() {
        let clock = ManualClock::new(0);
        let mut m = Stepper::new(200, 60, DriveMode::HalfStep, None, SimPort::new(), &clock);
        m.hold();
        m.set_target_speed(60);
        for _ in 0..100 {
            clock.advance(2_500);
            m.poll();
        }
        assert_eq!(m.port().energized(), 0);
    }

    #[test]
    fn free_releases_outputs() {
        let clock = ManualClock::new(0);
        let mut m = motor(DriveMode::DualPhase, &clock);
        m.enable(true);
        m.hold();
        let (port, _) = m.free();
        assert_eq!(port.claimed, 0);
        assert_eq!(port.energized(), 0);
    }
}
