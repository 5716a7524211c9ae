// SPDX-License-Identifier: MIT
// © 2025–2026 Christopher Liu

//! Winding energization patterns.
//!
//! The set of energized windings is a bit pattern, one bit per registered winding. Stepping rotates
//! the active bit(s) by one position around a ring as wide as the winding count.
//!
//! Half-step drive keeps two single-bit masks and advances only one of them per step, so the
//! combined pattern alternates between one and two energized windings:
//!
//! ```text
//! 1001 -> 1000 -> 1100 -> 0100 -> 0110 -> 0010 -> 0011 -> 0001 -> 1001
//! ```

/// Energization scheme, fixed for the life of a motor.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DriveMode {
    /// One winding energized at a time.
    Wave,
    /// Two adjacent windings energized at a time.
    DualPhase,
    /// Alternates between one and two windings, doubling the resolution.
    HalfStep,
}

impl DriveMode {
    /// Micro-states per full step.
    #[inline]
    pub const fn resolution(self) -> u32 {
        match self {
            DriveMode::Wave | DriveMode::DualPhase => 1,
            DriveMode::HalfStep => 2,
        }
    }

    /// `(primary, secondary)` masks of the stationary holding state.
    ///
    /// In half-step drive both masks start on the same winding so that whichever advances first
    /// produces the same direction of motion.
    #[inline]
    pub const fn hold_masks(self) -> (u32, u32) {
        match self {
            DriveMode::Wave => (0b1, 0),
            DriveMode::DualPhase => (0b11, 0),
            DriveMode::HalfStep => (0b1, 0b1),
        }
    }
}

/// Rotate `mask` by one position within a ring of `width` bits.
///
/// Forward moves bits toward bit 0, with bit 0 wrapping to the top. Reverse moves bits up, with the
/// top bit wrapping to bit 0. Bits outside the ring are dropped.
pub fn rotate(mask: u32, forward: bool, width: u32) -> u32 {
    let width = width.min(32);
    let ring = (1u64 << width) - 1;
    let mut m = mask as u64;

    if forward {
        if m & 1 != 0 {
            m |= 1 << width;
        }
        m >>= 1;
    } else {
        m <<= 1;
        if m & (1 << width) != 0 {
            m |= 1;
        }
    }

    (m & ring) as u32
}

/// The two rotating masks of a motor.
#[derive(Clone, Debug)]
pub struct PhaseSequencer {
    mode: DriveMode,
    primary: u32,
    secondary: u32,
}

impl PhaseSequencer {
    /// Create a sequencer with every winding off.
    pub const fn new(mode: DriveMode) -> Self {
        Self {
            mode,
            primary: 0,
            secondary: 0,
        }
    }

    #[inline]
    pub fn mode(&self) -> DriveMode {
        self.mode
    }

    #[inline]
    pub fn primary(&self) -> u32 {
        self.primary
    }

    #[inline]
    pub fn secondary(&self) -> u32 {
        self.secondary
    }

    /// Combined pattern of energized windings.
    #[inline]
    pub fn pattern(&self) -> u32 {
        self.primary | self.secondary
    }

    /// Energize the holding pattern for the drive mode.
    pub fn hold(&mut self) {
        let (primary, secondary) = self.mode.hold_masks();
        self.primary = primary;
        self.secondary = secondary;
    }

    /// De-energize every winding.
    pub fn brake(&mut self) {
        self.primary = 0;
        self.secondary = 0;
    }

    /// Advance one micro-state.
    ///
    /// `step_count` is the number of steps taken so far; in half-step drive odd counts advance the
    /// primary mask and even counts the secondary one. If the windings are braked the sequencer
    /// re-enters the holding pattern instead and returns `false`: no step was taken.
    pub fn advance(&mut self, step_count: u64, forward: bool, width: u32) -> bool {
        if self.primary == 0 {
            self.hold();
            return false;
        }

        if self.mode != DriveMode::HalfStep || step_count & 1 == 1 {
            self.primary = rotate(self.primary, forward, width);
        } else {
            self.secondary = rotate(self.secondary, forward, width);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_wraps_both_ways() {
        assert_eq!(rotate(0b0001, true, 4), 0b1000);
        assert_eq!(rotate(0b1000, true, 4), 0b0100);
        assert_eq!(rotate(0b1000, false, 4), 0b0001);
        assert_eq!(rotate(0b0011, true, 4), 0b1001);
        assert_eq!(rotate(0b1001, false, 4), 0b0011);
    }

    #[test]
    fn rotate_full_width_ring() {
        assert_eq!(rotate(1, true, 32), 0x8000_0000);
        assert_eq!(rotate(0x8000_0000, false, 32), 1);
    }

    #[test]
    fn rotate_with_no_windings_is_empty() {
        assert_eq!(rotate(0b1, true, 0), 0);
    }

    #[test]
    fn dual_phase_cycle() {
        let mut seq = PhaseSequencer::new(DriveMode::DualPhase);
        seq.hold();
        let mut seen = [0u32; 4];
        for (i, slot) in seen.iter_mut().enumerate() {
            assert!(seq.advance(i as u64, true, 4));
            *slot = seq.pattern();
        }
        assert_eq!(seen, [0b1001, 0b1100, 0b0110, 0b0011]);
    }

    #[test]
    fn half_step_cycle_has_eight_states() {
        let mut seq = PhaseSequencer::new(DriveMode::HalfStep);
        seq.hold();
        assert_eq!(seq.pattern(), 0b0001);

        let expected = [
            0b1001, 0b1000, 0b1100, 0b0100, 0b0110, 0b0010, 0b0011, 0b0001,
        ];
        for (i, want) in expected.iter().enumerate() {
            seq.advance(i as u64, true, 4);
            assert_eq!(seq.pattern(), *want, "after step {}", i);
        }
    }

    #[test]
    fn half_step_moves_exactly_one_mask_per_step() {
        let mut seq = PhaseSequencer::new(DriveMode::HalfStep);
        seq.hold();
        for count in 0..32u64 {
            let (p, s) = (seq.primary(), seq.secondary());
            seq.advance(count, count % 3 != 0, 4);
            let primary_moved = seq.primary() != p;
            let secondary_moved = seq.secondary() != s;
            assert!(primary_moved ^ secondary_moved);
            assert_eq!(primary_moved, count % 2 == 1);
        }
    }

    #[test]
    fn braked_advance_holds_instead() {
        let mut seq = PhaseSequencer::new(DriveMode::Wave);
        seq.hold();
        seq.brake();
        assert_eq!(seq.pattern(), 0);
        assert!(!seq.advance(7, true, 4));
        assert_eq!(seq.pattern(), 0b1);
    }
}
