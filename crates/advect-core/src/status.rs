//! The [`ParticleStatus`] flag set.
//!
//! One byte-wide bitfield shared by particle records and execution views.
//! Records use the single-bit `set_*` / `clear_*` / `check_*` methods; the
//! execution layer uses the `mark_*` transitions, which also clear `OK`.
//!
//! | Bit  | Flag             |
//! |------|------------------|
//! | 0x01 | `OK`             |
//! | 0x02 | `TERMINATED`     |
//! | 0x04 | `SPATIAL_BOUNDS` |
//! | 0x08 | `TEMPORAL_BOUNDS`|
//! | 0x10 | `ERROR`          |
//! | 0x20 | `TOOK_ANY_STEPS` |
//! | 0x40 | `IN_GHOST_CELL`  |
//!
//! The bitfield enforces no coupling between flags: setting a boundary bit
//! through the record API leaves `OK` untouched.

use std::fmt;

bitflags::bitflags! {
    /// Lifecycle flags of a single particle.
    ///
    /// Default-constructed status has `OK` set and every other flag clear.
    /// `fail` is not a separate bit; it is the negation of `OK`.
    #[derive(Clone, Copy, PartialEq, Eq, Hash)]
    #[repr(transparent)]
    pub struct ParticleStatus: u8 {
        /// Particle is viable for further integration.
        const OK = 1;
        /// Particle was explicitly ended (e.g. reached the step limit).
        const TERMINATED = 1 << 1;
        /// Particle left the valid spatial domain.
        const SPATIAL_BOUNDS = 1 << 2;
        /// Particle left the valid temporal domain.
        const TEMPORAL_BOUNDS = 1 << 3;
        /// Particle hit an integration error.
        const ERROR = 1 << 4;
        /// Particle advanced at least once this run.
        const TOOK_ANY_STEPS = 1 << 5;
        /// Particle currently resides in a ghost (halo) cell.
        const IN_GHOST_CELL = 1 << 6;
    }
}

impl ParticleStatus {
    /// A status with only `OK` set. Equal to [`ParticleStatus::default`].
    pub const fn ok() -> Self {
        Self::OK
    }

    // ── Record-level single-bit API ─────────────────────────────

    /// Set `OK`.
    pub fn set_ok(&mut self) {
        self.insert(Self::OK);
    }
    /// Whether `OK` is set.
    pub fn check_ok(self) -> bool {
        self.contains(Self::OK)
    }

    /// Clear `OK`.
    pub fn set_fail(&mut self) {
        self.remove(Self::OK);
    }
    /// Whether `OK` is clear.
    pub fn check_fail(self) -> bool {
        !self.check_ok()
    }

    /// Set `TERMINATED`.
    pub fn set_terminate(&mut self) {
        self.insert(Self::TERMINATED);
    }
    /// Clear `TERMINATED`.
    pub fn clear_terminate(&mut self) {
        self.remove(Self::TERMINATED);
    }
    /// Whether `TERMINATED` is set.
    pub fn check_terminate(self) -> bool {
        self.contains(Self::TERMINATED)
    }

    /// Set `SPATIAL_BOUNDS`.
    pub fn set_spatial_bounds(&mut self) {
        self.insert(Self::SPATIAL_BOUNDS);
    }
    /// Clear `SPATIAL_BOUNDS`.
    pub fn clear_spatial_bounds(&mut self) {
        self.remove(Self::SPATIAL_BOUNDS);
    }
    /// Whether `SPATIAL_BOUNDS` is set.
    pub fn check_spatial_bounds(self) -> bool {
        self.contains(Self::SPATIAL_BOUNDS)
    }

    /// Set `TEMPORAL_BOUNDS`.
    pub fn set_temporal_bounds(&mut self) {
        self.insert(Self::TEMPORAL_BOUNDS);
    }
    /// Clear `TEMPORAL_BOUNDS`.
    pub fn clear_temporal_bounds(&mut self) {
        self.remove(Self::TEMPORAL_BOUNDS);
    }
    /// Whether `TEMPORAL_BOUNDS` is set.
    pub fn check_temporal_bounds(self) -> bool {
        self.contains(Self::TEMPORAL_BOUNDS)
    }

    /// Set `ERROR`.
    pub fn set_error(&mut self) {
        self.insert(Self::ERROR);
    }
    /// Clear `ERROR`.
    pub fn clear_error(&mut self) {
        self.remove(Self::ERROR);
    }
    /// Whether `ERROR` is set.
    pub fn check_error(self) -> bool {
        self.contains(Self::ERROR)
    }

    /// Set `TOOK_ANY_STEPS`.
    pub fn set_took_any_steps(&mut self) {
        self.insert(Self::TOOK_ANY_STEPS);
    }
    /// Clear `TOOK_ANY_STEPS`.
    pub fn clear_took_any_steps(&mut self) {
        self.remove(Self::TOOK_ANY_STEPS);
    }
    /// Whether `TOOK_ANY_STEPS` is set.
    pub fn check_took_any_steps(self) -> bool {
        self.contains(Self::TOOK_ANY_STEPS)
    }

    /// Set `IN_GHOST_CELL`.
    pub fn set_in_ghost_cell(&mut self) {
        self.insert(Self::IN_GHOST_CELL);
    }
    /// Clear `IN_GHOST_CELL`.
    pub fn clear_in_ghost_cell(&mut self) {
        self.remove(Self::IN_GHOST_CELL);
    }
    /// Whether `IN_GHOST_CELL` is set.
    pub fn check_in_ghost_cell(self) -> bool {
        self.contains(Self::IN_GHOST_CELL)
    }

    // ── Execution-level transitions ─────────────────────────────

    /// Clear every flag, then set only `OK`.
    pub fn reset_ok(&mut self) {
        *self = Self::ok();
    }

    /// Clear `OK` and set `TERMINATED`. Other flags are untouched.
    pub fn mark_terminated(&mut self) {
        self.remove(Self::OK);
        self.insert(Self::TERMINATED);
    }

    /// Clear `OK` and set `SPATIAL_BOUNDS`. Other flags are untouched.
    pub fn mark_exit_spatial_boundary(&mut self) {
        self.remove(Self::OK);
        self.insert(Self::SPATIAL_BOUNDS);
    }

    /// Clear `OK` and set `TEMPORAL_BOUNDS`. Other flags are untouched.
    pub fn mark_exit_temporal_boundary(&mut self) {
        self.remove(Self::OK);
        self.insert(Self::TEMPORAL_BOUNDS);
    }

    /// Clear `OK` and set `ERROR`. Other flags are untouched.
    pub fn mark_error(&mut self) {
        self.remove(Self::OK);
        self.insert(Self::ERROR);
    }

    /// Set or clear `TOOK_ANY_STEPS` without touching `OK`.
    pub fn assign_took_any_steps(&mut self, value: bool) {
        if value {
            self.set_took_any_steps();
        } else {
            self.clear_took_any_steps();
        }
    }

    /// `OK && !(TERMINATED || SPATIAL_BOUNDS || TEMPORAL_BOUNDS)`.
    ///
    /// `ERROR` is not in the blocking set: a raw status
    /// carrying both `OK` and `ERROR` still reports integrateable. Going
    /// through [`mark_error`](Self::mark_error) clears `OK`, so errored
    /// particles produced by the execution layer are never integrateable.
    pub fn is_integrateable(self) -> bool {
        self.check_ok()
            && !(self.check_terminate()
                || self.check_spatial_bounds()
                || self.check_temporal_bounds())
    }

    /// Negation of [`is_integrateable`](Self::is_integrateable).
    pub fn is_done(self) -> bool {
        !self.is_integrateable()
    }
}

impl Default for ParticleStatus {
    fn default() -> Self {
        Self::ok()
    }
}

impl From<ParticleStatus> for u8 {
    fn from(s: ParticleStatus) -> Self {
        s.bits()
    }
}

impl fmt::Debug for ParticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticleStatus({:#04x} {self})", self.bits())
    }
}

impl fmt::Display for ParticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ok= {} term= {} spat= {} temp= {} err= {} ghst= {}]",
            u8::from(self.check_ok()),
            u8::from(self.check_terminate()),
            u8::from(self.check_spatial_bounds()),
            u8::from(self.check_temporal_bounds()),
            u8::from(self.check_error()),
            u8::from(self.check_in_ghost_cell()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn default_is_ok_and_nothing_else() {
        let s = ParticleStatus::default();
        assert!(s.check_ok());
        assert!(!s.check_fail());
        assert!(!s.check_terminate());
        assert!(!s.check_spatial_bounds());
        assert!(!s.check_temporal_bounds());
        assert!(!s.check_error());
        assert!(!s.check_took_any_steps());
        assert!(!s.check_in_ghost_cell());
        assert_eq!(s, ParticleStatus::OK);
    }

    #[test]
    fn fail_is_negation_of_ok() {
        let mut s = ParticleStatus::default();
        s.set_fail();
        assert!(s.check_fail());
        assert!(!s.check_ok());
        s.set_ok();
        assert!(!s.check_fail());
    }

    #[test]
    fn record_setters_do_not_couple_to_ok() {
        let mut s = ParticleStatus::default();
        s.set_spatial_bounds();
        s.set_terminate();
        assert!(s.check_ok());
        assert!(s.check_spatial_bounds());
        assert!(s.check_terminate());
        // Still OK at the bit level, but no longer integrateable.
        assert!(s.is_done());
    }

    #[test]
    fn reset_ok_clears_everything_else() {
        let mut s = ParticleStatus::from_bits_truncate(0xff);
        s.reset_ok();
        assert_eq!(s, ParticleStatus::ok());
    }

    #[test]
    fn mark_transitions_preserve_took_any_steps() {
        for mark in [
            ParticleStatus::mark_terminated as fn(&mut ParticleStatus),
            ParticleStatus::mark_exit_spatial_boundary,
            ParticleStatus::mark_exit_temporal_boundary,
            ParticleStatus::mark_error,
        ] {
            let mut s = ParticleStatus::default();
            s.assign_took_any_steps(true);
            mark(&mut s);
            assert!(!s.check_ok());
            assert!(s.check_took_any_steps());
            assert_eq!(s.bits().count_ones(), 2);
        }
    }

    #[test]
    fn ok_plus_error_is_still_integrateable() {
        let s = ParticleStatus::OK | ParticleStatus::ERROR;
        assert!(s.check_error());
        assert!(s.is_integrateable());
        assert!(!s.is_done());
    }

    #[test]
    fn named_flags_keep_their_bit_positions() {
        let expected = [
            (ParticleStatus::OK, 0x01),
            (ParticleStatus::TERMINATED, 0x02),
            (ParticleStatus::SPATIAL_BOUNDS, 0x04),
            (ParticleStatus::TEMPORAL_BOUNDS, 0x08),
            (ParticleStatus::ERROR, 0x10),
            (ParticleStatus::TOOK_ANY_STEPS, 0x20),
            (ParticleStatus::IN_GHOST_CELL, 0x40),
        ];
        for (flag, bits) in expected {
            assert_eq!(flag.bits(), bits);
        }
        assert_eq!(ParticleStatus::all().bits(), 0x7f);
        assert_eq!(ParticleStatus::empty().bits(), 0);
    }

    #[test]
    fn marked_error_is_done() {
        let mut s = ParticleStatus::default();
        s.mark_error();
        assert!(s.is_done());
    }

    #[test]
    fn from_bits_rejects_undefined_high_bit() {
        assert_eq!(ParticleStatus::from_bits(0x80), None);
        assert_eq!(ParticleStatus::from_bits_truncate(0x81), ParticleStatus::ok());
    }

    #[test]
    fn display_lists_flags() {
        let mut s = ParticleStatus::default();
        s.mark_terminated();
        assert_eq!(
            s.to_string(),
            "[ok= 0 term= 1 spat= 0 temp= 0 err= 0 ghst= 0]"
        );
    }

    proptest! {
        #[test]
        fn set_and_clear_touch_one_bit(start in 0u8..=ParticleStatus::all().bits(), bit in 0u32..7) {
            let start = ParticleStatus::from_bits_truncate(start);
            let mask = 1u8 << bit;

            let mut s = start;
            match bit {
                0 => s.set_ok(),
                1 => s.set_terminate(),
                2 => s.set_spatial_bounds(),
                3 => s.set_temporal_bounds(),
                4 => s.set_error(),
                5 => s.set_took_any_steps(),
                _ => s.set_in_ghost_cell(),
            }
            prop_assert_eq!(s.bits(), start.bits() | mask);

            match bit {
                0 => s.set_fail(),
                1 => s.clear_terminate(),
                2 => s.clear_spatial_bounds(),
                3 => s.clear_temporal_bounds(),
                4 => s.clear_error(),
                5 => s.clear_took_any_steps(),
                _ => s.clear_in_ghost_cell(),
            }
            prop_assert_eq!(s.bits(), start.bits() & !mask);
        }

        #[test]
        fn done_is_not_integrateable(bits in any::<u8>()) {
            let s = ParticleStatus::from_bits_truncate(bits);
            prop_assert_eq!(s.is_done(), !s.is_integrateable());
        }
    }
}
