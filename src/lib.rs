// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # stepdrive Firmware
//!
//! This crate contains the firmware for a front-panel stepper motor controller, written in Rust,
//! targeting an STM32F777 MCU. Three buttons set and start a target speed, a serial character LCD
//! shows the state, and a unipolar stepper is driven open loop with bounded acceleration.
//!
//! ## Crate Structure
//!
//! | Module | Purpose |
//! | ------ | -------- |
//! | [`hw`] | MCU-level wrappers around GPIO, timers, USART, flash, buttons, etc. |
//! | [`drivers`] | Device-level drivers (NHD-K3Z display) |
//! | [`motors`] | Stepper motor: phase sequencing, winding outputs, step clock |
//! | [`control`] | Control algorithms (acceleration ramp) |
//! | [`settings`] | Settings persisted across power cycles |
//! | [`config`] | Board and tuning constants |
//! | [`app`] | Front-panel application logic |
//!
//! Everything outside the target-only `hw` modules builds and tests on the host:
//!
//! ```bash
//! cargo test
//! ```
//!
//! ## Getting Started
//!
//! Build docs:
//!
//! ```bash
//! cargo doc --no-deps --open
//! ```
//!
//! Flash the board:
//!
//! ```bash
//! cargo run --release --target thumbv7em-none-eabihf
//! ```
//!
//! ## License
//!
//! Licensed under the **MIT License**.
//! See the `LICENSE` file in the repository root for full terms.
//!
//! © 2025–2026 Christopher Liu

#![cfg_attr(not(test), no_std)]

pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod hw;
pub mod motors;
pub mod settings;
