// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Actuator Abstractions
//!
//! This module contains the stepper motor and the pieces it is built from.
//!
//! ## Modules
//!
//! - [`phase`] - Winding energization patterns and drive modes.
//! - [`windings`] - Winding outputs and driver-stage enable on an `OutputPort`.
//! - [`stepper`] - Self-paced stepper built on the above and the [`Ramp`](crate::control::Ramp).

pub mod phase;
pub mod stepper;
pub mod windings;

pub use phase::{DriveMode, PhaseSequencer};
pub use stepper::{Stepper, Tick};
pub use windings::{Winding, WindingError, Windings};
