// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Control Algorithms
//!
//! This module provides reusable building blocks for open-loop motor control.
//!
//! ## Modules
//!
//! - [`ramp`] - Bounded-acceleration ramp for a step interval.

pub mod ramp;

pub use ramp::{Ramp, RampState};
