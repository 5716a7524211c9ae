// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! # Device-Specific Drivers
//!
//! This module contains device-specific drivers that sit above the raw `hw/` layer and below the
//! application logic.
//!
//! ## Existing drivers
//!
//! - [`nhd_k3z`] – Newhaven NHD-0216K3Z serial character LCD

pub mod nhd_k3z;

pub use nhd_k3z::NhdK3z;
