// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Board and tuning constants.

use crate::drivers::nhd_k3z::Baud;
use crate::motors::DriveMode;

pub const VERSION: &str = "1.0";

// Motor
pub const MAX_RPM: u32 = 60;
pub const RPM_STEP: u32 = 5;
/// Full steps per revolution of the motor.
pub const STEPS_PER_REV: u32 = 200;
/// Half-step drive: uneven torque, but twice the resolution and much smoother motion.
pub const DRIVE_MODE: DriveMode = DriveMode::HalfStep;
/// Acceleration limit (rpm per second).
pub const MOTOR_ACCEL: u32 = 60;
/// Speed the ramp starts from and stops at.
pub const MIN_RAMP_RPM: u32 = RPM_STEP;
/// Speed applied when no valid settings are stored.
pub const DEFAULT_RPM: u32 = 20;

/// Winding PWM frequency, high enough to be (mostly) inaudible while holding.
pub const MOTOR_PWM_HZ: u32 = 15_000;
/// Winding PWM duty (%), found empirically by driver temperature.
pub const MOTOR_DUTY_PERCENT: u32 = 40;

/// Winding outputs, in sequencer order (PD12..PD15 on TIM4 CH1..CH4).
pub const WINDING_OUTPUTS: [u8; 4] = [12, 13, 14, 15];
/// Driver stage enable output (PD11).
pub const ENABLE_OUTPUT: u8 = 11;

// Panel
pub const DEBOUNCE_MS: u32 = 35;
pub const REPEAT_DELAY_MS: u32 = 1_000;
pub const REPEAT_PERIOD_MS: u32 = 500;
/// Hold start/stop this long while stopped to sleep.
pub const LONG_PRESS_US: u64 = 4_000_000;
/// Idle time (while stopped) before sleeping.
pub const SLEEP_TIMEOUT_US: u64 = 60 * 1_000_000;
/// How long "Sleeping..." stays up before the panel goes dark.
pub const SLEEP_MESSAGE_US: u64 = 1_000_000;

// Display
/// Rate the display module powers up at.
pub const DISPLAY_POWER_UP_BAUD: u32 = 9_600;
/// Rate the display is switched to at bring-up.
pub const DISPLAY_BAUD: Baud = Baud::B57600;
pub const DISPLAY_CONTRAST: u8 = 50;
pub const BRIGHTNESS_AWAKE: u8 = 8;
pub const BRIGHTNESS_ASLEEP: u8 = 1;
/// Display power-up time before the first command.
pub const DISPLAY_POWER_UP_MS: u32 = 1_000;
/// How long the version splash is shown.
pub const SPLASH_MS: u32 = 2_000;

// Debug console
pub const CONSOLE_BAUD: u32 = 115_200;
