// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Front-panel application: three buttons, a two-line display, one stepper.
//!
//! Up/down adjust the target speed in [`RPM_STEP`] increments, start/stop toggles the motor, and
//! holding start/stop while stopped puts the panel to sleep (driver off, backlight dimmed, fan
//! off). The panel also sleeps on its own after [`SLEEP_TIMEOUT_US`] idle while stopped; any
//! button release wakes it.
//!
//! [`App::tick`] never blocks. The main loop samples the buttons through [`Panel::update`] and
//! passes the resulting [`PanelInput`] in.

use core::fmt::{self, Write as _};

use embedded_hal::digital::v2::{InputPin, OutputPin};
use embedded_hal::serial;

use crate::config::{
    BRIGHTNESS_ASLEEP, BRIGHTNESS_AWAKE, DEBOUNCE_MS, DISPLAY_CONTRAST, LONG_PRESS_US, MAX_RPM,
    MIN_RAMP_RPM, MOTOR_ACCEL, REPEAT_DELAY_MS, REPEAT_PERIOD_MS, RPM_STEP, SLEEP_MESSAGE_US,
    SLEEP_TIMEOUT_US, VERSION,
};
use crate::drivers::nhd_k3z::{NhdK3z, LINE_2};
use crate::hw::button::Button;
use crate::hw::clock::Monotonic;
use crate::hw::led::{ActiveLevel, Led};
use crate::hw::port::OutputPort;
use crate::motors::Stepper;
use crate::settings::{Settings, SettingsStore};

const US_PER_SEC: u64 = 1_000_000;

/// Button events for one loop iteration.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelInput {
    pub up_repeats: u32,
    pub down_repeats: u32,
    pub up_released: bool,
    pub down_released: bool,
    pub start_stop_released: bool,
    /// How long start/stop has been held, while it is held.
    pub start_stop_held_us: Option<u64>,
}

/// The three panel buttons (active low, pulled up).
pub struct Panel<UP: InputPin, DOWN: InputPin, SS: InputPin> {
    up: Button<UP>,
    down: Button<DOWN>,
    start_stop: Button<SS>,
}

impl<UP: InputPin, DOWN: InputPin, SS: InputPin> Panel<UP, DOWN, SS> {
    pub fn new(up: UP, down: DOWN, start_stop: SS) -> Self {
        Self {
            up: panel_button(up),
            down: panel_button(down),
            start_stop: panel_button(start_stop),
        }
    }

    /// Sample every button and collect this iteration's events.
    pub fn update(&mut self, now_us: u64) -> PanelInput {
        self.up.update(now_us);
        self.down.update(now_us);
        self.start_stop.update(now_us);
        // Start/stop acts on release and hold time only.
        self.start_stop.take_repeats();

        PanelInput {
            up_repeats: self.up.take_repeats(),
            down_repeats: self.down.take_repeats(),
            up_released: self.up.up(),
            down_released: self.down.up(),
            start_stop_released: self.start_stop.up(),
            start_stop_held_us: self
                .start_stop
                .is_pressed()
                .then(|| self.start_stop.current_duration_us(now_us)),
        }
    }
}

fn panel_button<PIN: InputPin>(pin: PIN) -> Button<PIN> {
    Button::new(pin, ActiveLevel::Low, DEBOUNCE_MS).with_repeat(REPEAT_DELAY_MS, REPEAT_PERIOD_MS)
}

/// Split elapsed microseconds into hours, minutes and seconds.
pub fn hms(us: u64) -> (u64, u64, u64) {
    let secs = us / US_PER_SEC;
    (secs / 3600, (secs / 60) % 60, secs % 60)
}

pub struct App<P, C, TX, S, FAN, LED, LOG>
where
    P: OutputPort,
    C: Monotonic,
    TX: serial::Write<u8>,
    S: SettingsStore,
    FAN: OutputPin,
    LED: OutputPin,
    LOG: fmt::Write,
{
    motor: Stepper<P, C>,
    display: NhdK3z<TX>,
    store: S,
    settings: Settings,
    fan: FAN,
    /// Lit while the step clock is falling behind
    load_led: Led<LED>,
    console: LOG,

    running: bool,
    run_start_us: u64,
    run_secs: u64,
    sleeping: bool,
    idle_since_us: u64,
    /// "Sleeping..." is showing; the panel goes dark at this time
    sleep_at_us: Option<u64>,
    /// The start/stop release that ends a long press must not toggle anything
    swallow_release: bool,
}

impl<P, C, TX, S, FAN, LED, LOG> App<P, C, TX, S, FAN, LED, LOG>
where
    P: OutputPort,
    C: Monotonic,
    TX: serial::Write<u8>,
    S: SettingsStore,
    S::Error: fmt::Debug,
    FAN: OutputPin,
    LED: OutputPin,
    LOG: fmt::Write,
{
    /// Load settings and take ownership of the panel hardware. The fan starts off.
    ///
    /// A stored target outside `[RPM_STEP, MAX_RPM]` is clamped into range.
    pub fn new(
        motor: Stepper<P, C>,
        display: NhdK3z<TX>,
        store: S,
        mut fan: FAN,
        load_led: Led<LED>,
        console: LOG,
    ) -> Self {
        let mut settings = Settings::load(&store);
        settings.target_rpm = settings.target_rpm.clamp(RPM_STEP, MAX_RPM);
        let _ = fan.set_low();

        Self {
            motor,
            display,
            store,
            settings,
            fan,
            load_led,
            console,
            running: false,
            run_start_us: 0,
            run_secs: 0,
            sleeping: false,
            idle_since_us: 0,
            sleep_at_us: None,
            swallow_release: false,
        }
    }

    #[inline]
    fn now(&self) -> u64 {
        self.motor.clock().now_us()
    }

    /// Initialize the display and show the firmware version.
    pub fn splash(&mut self) {
        self.display.set_display_on(true);
        self.display.set_contrast(DISPLAY_CONTRAST);
        self.display.set_brightness(BRIGHTNESS_AWAKE);
        self.display.set_cursor_blink(false);
        self.display.set_cursor_underline(false);
        self.display.clear();
        self.display.home();
        let _ = write!(self.display, "Version {}", VERSION);
    }

    /// Power the motor into its holding position and show the idle screen.
    pub fn boot(&mut self) {
        self.motor.configure_acceleration(MOTOR_ACCEL, MIN_RAMP_RPM);
        self.motor.enable(true);
        self.motor.hold();

        let now = self.now();
        self.idle_since_us = now;
        self.render(now);
        let _ = self.fan.set_high();

        let _ = write!(
            self.console,
            "Booted, target RPM {}\r\n",
            self.settings.target_rpm
        );
    }

    /// Run one main-loop iteration.
    pub fn tick(&mut self, input: &PanelInput) {
        let now = self.now();
        let mut redraw = false;

        if self.sleep_at_us.is_some_and(|at| now >= at) {
            self.sleep_at_us = None;
            self.set_sleep(true);
        }

        if !self.running
            && !self.sleeping
            && self.sleep_at_us.is_none()
            && now >= self.idle_since_us + SLEEP_TIMEOUT_US
        {
            self.set_sleep(true);
        }

        if self.running {
            let secs = (now - self.run_start_us) / US_PER_SEC;
            if secs != self.run_secs {
                self.run_secs = secs;
                redraw = true;
            }
        }

        let tick = self.motor.poll();
        self.load_led.set(tick.behind);

        let mut start_stop_released = input.start_stop_released;
        if start_stop_released && self.swallow_release {
            self.swallow_release = false;
            start_stop_released = false;
        }

        if self.sleep_at_us.is_some() {
            // Panel is ignored until it has gone dark.
        } else if self.sleeping {
            if input.up_released || input.down_released || start_stop_released {
                self.set_sleep(false);
                self.idle_since_us = now;
            }
        } else {
            if input.up_repeats != 0 {
                self.set_target_rpm(self.settings.target_rpm + RPM_STEP);
                self.idle_since_us = now;
                redraw = true;
            }

            if input.down_repeats != 0 {
                self.set_target_rpm(self.settings.target_rpm.saturating_sub(RPM_STEP));
                self.idle_since_us = now;
                redraw = true;
            }

            let long_press = input
                .start_stop_held_us
                .is_some_and(|held| held >= LONG_PRESS_US);

            if !self.running && long_press {
                self.display.clear();
                self.display.home();
                self.display.write_str("Sleeping...");
                self.sleep_at_us = Some(now + SLEEP_MESSAGE_US);
                self.swallow_release = true;
                redraw = false;
            } else if start_stop_released {
                self.toggle_run(now);
                self.idle_since_us = now;
                redraw = true;
            }
        }

        if redraw {
            self.render(now);
        }
    }

    fn toggle_run(&mut self, now: u64) {
        self.running = !self.running;

        match self.settings.save(&mut self.store) {
            Ok(true) => {
                let _ = write!(self.console, "Settings saved\r\n");
            }
            Ok(false) => {}
            Err(e) => {
                let _ = write!(self.console, "Failed to save settings: {:?}\r\n", e);
            }
        }

        if self.running {
            self.motor.set_target_speed(self.settings.target_rpm);
            self.run_start_us = now;
            self.run_secs = 0;
        } else {
            self.motor.set_target_speed(0);
        }
    }

    fn set_target_rpm(&mut self, rpm: u32) {
        self.settings.target_rpm = rpm.clamp(RPM_STEP, MAX_RPM);
        if self.running {
            self.motor.set_target_speed(self.settings.target_rpm);
        }

        let _ = write!(
            self.console,
            "Target RPM is now {}\r\n",
            self.settings.target_rpm
        );
    }

    /// Redraw both display lines. Nothing is drawn while asleep.
    fn render(&mut self, now: u64) {
        if self.sleeping {
            return;
        }

        self.display.clear();
        self.display.home();
        if self.running {
            let (h, m, s) = hms(now - self.run_start_us);
            let _ = write!(self.display, "Running {}:{:02}:{:02}", h, m, s);
        } else {
            self.display.write_str("Stopped");
        }

        let target = self.settings.target_rpm;
        self.display.set_cursor(LINE_2);
        let _ = write!(self.display, "RPM {}", target);
        if self.running {
            let actual = self.motor.effective_speed();
            if actual != 0 && actual != target {
                let _ = write!(self.display, " ({}%)", 100 * actual / target);
            }
        }
    }

    /// Enter or leave sleep. Waking re-energizes the holding pattern and redraws.
    pub fn set_sleep(&mut self, sleep: bool) {
        if self.sleeping == sleep {
            return;
        }
        self.sleeping = sleep;

        self.motor.enable(!sleep);
        if sleep {
            self.display.set_brightness(BRIGHTNESS_ASLEEP);
            let _ = self.fan.set_low();
        } else {
            self.display.set_brightness(BRIGHTNESS_AWAKE);
            self.motor.hold();
            let _ = self.fan.set_high();
            let now = self.now();
            self.render(now);
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[inline]
    pub fn motor(&self) -> &Stepper<P, C> {
        &self.motor
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    pub fn console(&self) -> &LOG {
        &self.console
    }

    #[inline]
    pub fn console_mut(&mut self) -> &mut LOG {
        &mut self.console
    }
}
