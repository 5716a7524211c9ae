// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Debounced push button with auto-repeat.
//!
//! Call [`Button::update`] once per main-loop iteration; the edge queries (`down`, `up`) and
//! `is_pressed` describe that update only. Holding the button past the repeat delay starts
//! counting repeats at the repeat period; [`Button::take_repeats`] drains the count, which also
//! includes the initial press.

use embedded_hal::digital::v2::InputPin;

use crate::hw::led::ActiveLevel;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum State {
    Released,
    Debounce,
    Pressed,
    Repeat,
}

pub struct Button<PIN: InputPin> {
    pin: PIN,
    active: ActiveLevel,
    debounce_us: u64,
    repeat_delay_us: u64,
    repeat_period_us: u64,

    state: State,
    /// Start of the debounce window, then of the press
    start_us: u64,
    last_duration_us: u64,
    last_repeat_us: u64,
    repeat_count: u32,

    down: bool,
    up: bool,
    is_pressed: bool,
}

impl<PIN: InputPin> Button<PIN> {
    pub fn new(pin: PIN, active: ActiveLevel, debounce_ms: u32) -> Self {
        Self {
            pin,
            active,
            debounce_us: debounce_ms as u64 * 1_000,
            repeat_delay_us: 0,
            repeat_period_us: 0,
            state: State::Released,
            start_us: 0,
            last_duration_us: 0,
            last_repeat_us: 0,
            repeat_count: 0,
            down: false,
            up: false,
            is_pressed: false,
        }
    }

    /// Enable auto-repeat: after `delay_ms` held, count a repeat every `period_ms`.
    ///
    /// A zero delay disables repeating; a zero period repeats once at the delay only.
    pub fn with_repeat(mut self, delay_ms: u32, period_ms: u32) -> Self {
        self.repeat_delay_us = delay_ms as u64 * 1_000;
        self.repeat_period_us = period_ms as u64 * 1_000;
        self
    }

    fn read(&self) -> bool {
        let level = match self.active {
            ActiveLevel::High => self.pin.is_high(),
            ActiveLevel::Low => self.pin.is_low(),
        };
        level.unwrap_or(false)
    }

    /// Sample the pin and advance the state machine.
    pub fn update(&mut self, now_us: u64) {
        let pressed = self.read();

        self.down = false;
        self.up = false;
        self.is_pressed = false;

        match self.state {
            State::Released => {
                if pressed {
                    self.state = State::Debounce;
                    self.start_us = now_us;
                }
            }

            State::Debounce => {
                if !pressed {
                    self.state = State::Released;
                } else if now_us >= self.start_us + self.debounce_us {
                    self.down = true;
                    self.state = State::Pressed;
                    self.start_us = now_us;
                    self.repeat_count = 1;
                }
            }

            State::Pressed | State::Repeat => {
                if self.state == State::Repeat && self.repeat_period_us != 0 {
                    while self.last_repeat_us + self.repeat_period_us < now_us {
                        self.repeat_count += 1;
                        self.last_repeat_us += self.repeat_period_us;
                    }
                }

                self.is_pressed = pressed;
                if !pressed {
                    self.up = true;
                    self.state = State::Released;
                    self.last_duration_us = now_us - self.start_us;
                } else if self.state == State::Pressed
                    && self.repeat_delay_us != 0
                    && now_us >= self.start_us + self.repeat_delay_us
                {
                    self.state = State::Repeat;
                    self.last_repeat_us = now_us;
                    self.repeat_count += 1;
                }
            }
        }
    }

    /// The button was pressed (debounced) on the last update.
    #[inline]
    pub fn down(&self) -> bool {
        self.down
    }

    /// The button was released on the last update.
    #[inline]
    pub fn up(&self) -> bool {
        self.up
    }

    /// The button is held, as of the last update.
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.is_pressed
    }

    /// Duration of the most recent completed press.
    #[inline]
    pub fn last_duration_us(&self) -> u64 {
        self.last_duration_us
    }

    /// Time since the current press began.
    #[inline]
    pub fn current_duration_us(&self, now_us: u64) -> u64 {
        now_us.saturating_sub(self.start_us)
    }

    /// Return and clear the press/repeat count.
    pub fn take_repeats(&mut self) -> u32 {
        core::mem::take(&mut self.repeat_count)
    }

    pub fn free(self) -> PIN {
        self.pin
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use core::convert::Infallible;

    /// Input pin whose level is set from the test.
    struct MockPin<'a>(&'a Cell<bool>);

    impl InputPin for MockPin<'_> {
        type Error = Infallible;

        fn is_high(&self) -> Result<bool, Infallible> {
            Ok(self.0.get())
        }

        fn is_low(&self) -> Result<bool, Infallible> {
            Ok(!self.0.get())
        }
    }

    const MS: u64 = 1_000;

    #[test]
    fn bounce_shorter_than_debounce_is_ignored() {
        let level = Cell::new(true);
        let mut b = Button::new(MockPin(&level), ActiveLevel::Low, 35);

        level.set(false);
        b.update(0);
        b.update(10 * MS);
        level.set(true);
        b.update(20 * MS);
        level.set(false);
        b.update(40 * MS);
        assert!(!b.down());
        assert_eq!(b.take_repeats(), 0);
    }

    #[test]
    fn press_and_release_edges() {
        let level = Cell::new(false);
        let mut b = Button::new(MockPin(&level), ActiveLevel::High, 35);

        level.set(true);
        b.update(0);
        b.update(35 * MS);
        assert!(b.down());
        b.update(40 * MS);
        assert!(!b.down());
        assert!(b.is_pressed());
        assert_eq!(b.current_duration_us(100 * MS), 65 * MS);

        level.set(false);
        b.update(135 * MS);
        assert!(b.up());
        assert!(!b.is_pressed());
        assert_eq!(b.last_duration_us(), 100 * MS);
        assert_eq!(b.take_repeats(), 1);
        assert_eq!(b.take_repeats(), 0);
    }

    #[test]
    fn held_button_repeats() {
        let level = Cell::new(false);
        let mut b = Button::new(MockPin(&level), ActiveLevel::High, 35).with_repeat(1000, 500);

        level.set(true);
        b.update(0);
        b.update(35 * MS);
        assert_eq!(b.take_repeats(), 1);

        b.update(900 * MS);
        assert_eq!(b.take_repeats(), 0);

        // Repeat delay reached.
        b.update(1035 * MS);
        assert_eq!(b.take_repeats(), 1);

        // Two periods later (strictly past the second boundary).
        b.update(2036 * MS);
        assert_eq!(b.take_repeats(), 2);

        level.set(false);
        b.update(2100 * MS);
        assert!(b.up());
    }

    #[test]
    fn no_repeat_without_delay() {
        let level = Cell::new(false);
        let mut b = Button::new(MockPin(&level), ActiveLevel::High, 0);

        level.set(true);
        b.update(0);
        b.update(0);
        assert!(b.down());
        b.take_repeats();
        b.update(10_000 * MS);
        assert_eq!(b.take_repeats(), 0);
    }
}
