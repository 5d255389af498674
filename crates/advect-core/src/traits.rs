//! Seams between the per-particle update and its collaborators.

use crate::error::CoreError;
use crate::id::{Scalar, Vec3};
use crate::particle::FieldSample;

/// Samples an external vector field at a position.
///
/// Implementations return one vector for plain advection (the velocity
/// field) or two for charged particles (electric field, then magnetic
/// field). Interpolation and cell location live behind this trait.
pub trait FieldSampler: Sync {
    /// Sample the field at `position` for a step of length `step_length`.
    fn sample(&self, position: &Vec3, step_length: Scalar) -> FieldSample;
}

impl<F> FieldSampler for F
where
    F: Fn(&Vec3, Scalar) -> FieldSample + Sync,
{
    fn sample(&self, position: &Vec3, step_length: Scalar) -> FieldSample {
        self(position, step_length)
    }
}

/// Per-particle integration contract.
///
/// Implemented by the particle records and by batch lanes, so a stepper
/// can drive either with identical logic.
pub trait Advectable {
    /// Point at which the field is sampled for the next step.
    fn evaluation_position(&self, delta_t: Scalar) -> Vec3;

    /// Velocity for a step of length `length` given the local field sample.
    ///
    /// Compute-and-commit: variants that carry momentum store the advanced
    /// momentum before returning, so this must be called exactly once per
    /// step.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::SampleArity`] when `sample` does not have the
    /// number of vectors the variant consumes.
    fn velocity(&mut self, sample: &FieldSample, length: Scalar) -> Result<Vec3, CoreError>;
}
