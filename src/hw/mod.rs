// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # MCU-Level Wrappers
//!
//! Portable building blocks (buttons, LEDs, the time and output-port traits, the debug console)
//! sit beside the STM32F777 peripheral wrappers, which are only built for the target.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! | ------ | ------- |
//! | [`button`] | Debounced push button with auto-repeat |
//! | [`clock`] | Monotonic microsecond time source |
//! | [`led`] | Status LED |
//! | [`port`] | Batched output port with PWM switching |
//! | [`usart`] | Debug console |
//! | [`flash`] | Settings sector in internal flash (`FlashStore` on target only) |
//! | [`pwm`] | Fixed-duty TIM4 PWM for the windings (`WindingPwm` on target only) |
//! | [`timer`] | TIM2 microsecond counter (`MicrosTimer` on target only) |
//! | `gpio` | GPIOD driver-stage port (target only) |
//! | `pins` | Board pin map (target only) |

pub mod button;
pub mod clock;
pub mod flash;
pub mod led;
pub mod port;
pub mod pwm;
pub mod timer;
pub mod usart;

#[cfg(target_os = "none")]
pub mod gpio;
#[cfg(target_os = "none")]
pub mod pins;

pub use button::Button;
pub use clock::Monotonic;
pub use led::Led;
pub use port::OutputPort;
pub use usart::Usart;
