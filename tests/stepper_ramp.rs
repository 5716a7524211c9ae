// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! End-to-end run of a half-step motor: ramp up to full speed, hold it, ramp down to a stop.

use stepdrive::control::RampState;
use stepdrive::hw::clock::ManualClock;
use stepdrive::hw::port::SimPort;
use stepdrive::motors::{DriveMode, Stepper};

const OUTPUTS: [u8; 4] = [12, 13, 14, 15];
const POLL_US: u64 = 20;

/// Energized windings, ignoring the enable output.
fn windings(m: &Stepper<SimPort, &ManualClock>) -> u32 {
    let mask = OUTPUTS.iter().fold(0, |acc, &o| acc | (1 << o));
    m.port().energized() & mask
}

fn motor(clock: &ManualClock) -> Stepper<SimPort, &ManualClock> {
    let mut m = Stepper::new(200, 60, DriveMode::HalfStep, Some(11), SimPort::new(), clock);
    for output in OUTPUTS {
        m.register_winding(output, true).unwrap();
    }
    m.configure_acceleration(60, 5);
    m.enable(true);
    m.hold();
    m
}

#[test]
fn ramp_up_hold_and_stop() {
    let clock = ManualClock::new(0);
    let mut m = motor(&clock);
    assert_eq!(m.steps_per_rev(), 400);

    m.set_target_speed(60);
    let mut approaching = 0;
    let mut polls = 0;
    while m.state() != RampState::Steady {
        clock.advance(POLL_US);
        m.poll();
        let rpm = m.effective_speed();
        assert!(rpm <= 60);
        if m.state() != RampState::Steady && (55..60).contains(&rpm) {
            approaching += 1;
        }
        polls += 1;
        assert!(polls < 1_000_000, "never reached steady state");
    }
    assert!(approaching > 0);
    assert_eq!(m.effective_speed(), 60);
    assert_eq!(m.interval_us(), 2_500);

    // Steady: one step per 2.5 ms.
    let before = m.step_count();
    for _ in 0..(100_000 / POLL_US) {
        clock.advance(POLL_US);
        m.poll();
    }
    assert_eq!(m.step_count() - before, 40);

    m.set_target_speed(0);
    let mut last_nonzero = m.effective_speed();
    loop {
        clock.advance(POLL_US);
        m.poll();
        match m.effective_speed() {
            0 => break,
            rpm => {
                assert!(rpm <= last_nonzero);
                last_nonzero = rpm;
            }
        }
    }
    assert!(last_nonzero <= 5);
    assert_eq!(m.state(), RampState::Stopped);

    // Stopped, but still holding position.
    assert!(m.is_energized());
    let steps = m.step_count();
    clock.advance(1_000_000);
    assert!(!m.poll().stepped);
    assert_eq!(m.step_count(), steps);
}

#[test]
fn half_steps_toggle_one_winding_at_a_time() {
    let clock = ManualClock::new(0);
    let mut m = motor(&clock);
    m.set_target_speed(60);

    let mut last = windings(&m);
    let mut steps = 0;
    while steps < 16 {
        clock.advance(POLL_US);
        if m.poll().stepped {
            let now = windings(&m);
            assert_eq!((now ^ last).count_ones(), 1, "step {}", steps);
            last = now;
            steps += 1;
        }
    }
    // Eight half steps per electrical cycle.
    assert_eq!(last, 1 << OUTPUTS[0]);
}

#[test]
fn brake_clears_and_hold_restores() {
    let clock = ManualClock::new(0);
    let mut m = motor(&clock);
    m.brake();
    assert_eq!(windings(&m), 0);
    assert!(!m.is_energized());
    m.hold();
    assert_eq!(windings(&m), 1 << OUTPUTS[0]);
}

#[test]
fn brake_at_full_speed_skips_the_ramp_down() {
    let clock = ManualClock::new(0);
    let mut m = motor(&clock);
    m.set_target_speed(60);
    while m.state() != RampState::Steady {
        clock.advance(POLL_US);
        m.poll();
    }

    m.brake();
    assert_eq!(m.effective_speed(), 0);
    assert_eq!(m.state(), RampState::Stopped);

    let steps = m.step_count();
    for _ in 0..(100_000 / POLL_US) {
        clock.advance(POLL_US);
        assert!(!m.poll().stepped);
    }
    assert_eq!(m.step_count(), steps);
    assert_eq!(windings(&m), 0);
}
