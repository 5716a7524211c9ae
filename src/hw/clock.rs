// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Monotonic microsecond time source.
//!
//! Everything that paces itself against wall-clock time (the stepper, the buttons, the sleep
//! timeout) reads one free-running counter through this trait instead of blocking on a delay.

use core::cell::Cell;

/// A free-running, monotonically increasing microsecond counter.
///
/// Reading the counter has no side effects visible to callers.
pub trait Monotonic {
    fn now_us(&self) -> u64;
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    #[inline]
    fn now_us(&self) -> u64 {
        (**self).now_us()
    }
}

/// Manually advanced clock, for host-side simulation and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u64>,
}

impl ManualClock {
    pub const fn new(start_us: u64) -> Self {
        Self {
            now: Cell::new(start_us),
        }
    }

    #[inline]
    pub fn set(&self, now_us: u64) {
        self.now.set(now_us);
    }

    #[inline]
    pub fn advance(&self, delta_us: u64) {
        self.now.set(self.now.get() + delta_us);
    }
}

impl Monotonic for ManualClock {
    #[inline]
    fn now_us(&self) -> u64 {
        self.now.get()
    }
}
