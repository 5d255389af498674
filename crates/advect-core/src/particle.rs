//! Particle records: the plain tracer [`Particle`] and the relativistic
//! [`ChargedParticle`].
//!
//! The free functions [`tracer_velocity`], [`charged_velocity`], and
//! [`charged_evaluation_position`] hold the variant logic; the records and
//! the batch lanes in `advect-batch` both delegate to them.

use std::fmt;
use std::mem::size_of;

use smallvec::SmallVec;

use crate::error::CoreError;
use crate::id::{ParticleId, Scalar, Vec3, SPEED_OF_LIGHT};
use crate::pusher::boris_push;
use crate::status::ParticleStatus;
use crate::traits::Advectable;

/// Vectors returned by a field sampler at one position.
///
/// Holds at most two vectors inline: the velocity for tracers, or the
/// electric then magnetic field for charged particles.
pub type FieldSample = SmallVec<[Vec3; 2]>;

/// Velocity of a passive tracer: the first sampled vector, unchanged.
///
/// A tracer field yields one vector. Extra vectors (for example a sampler
/// that returns `[E, B]`) are ignored rather than rejected; only an empty
/// sample is an error.
///
/// # Errors
///
/// [`CoreError::SampleArity`] if `sample` is empty.
#[inline]
pub fn tracer_velocity(sample: &FieldSample) -> Result<Vec3, CoreError> {
    sample.first().copied().ok_or(CoreError::SampleArity {
        expected: 1,
        found: 0,
    })
}

/// Velocity of a charged particle, committing the pushed momentum.
///
/// `sample` must hold exactly `[E, B]`.
///
/// # Errors
///
/// [`CoreError::SampleArity`] if `sample` does not hold exactly two vectors.
/// `momentum` is left untouched in that case.
#[inline]
pub fn charged_velocity(
    momentum: &mut Vec3,
    species: &Species,
    sample: &FieldSample,
    length: Scalar,
) -> Result<Vec3, CoreError> {
    match sample.as_slice() {
        [e, b] => Ok(boris_push(
            momentum,
            species.mass,
            species.charge,
            e,
            b,
            length,
        )),
        other => Err(CoreError::SampleArity {
            expected: 2,
            found: other.len(),
        }),
    }
}

/// Sample point for a charged particle: the stored position drifted by
/// `num_steps · delta_t · c` along `-z`.
///
/// This translates the lookup into the co-moving frame; it never changes the
/// stored position.
#[inline]
pub fn charged_evaluation_position(position: &Vec3, num_steps: i64, delta_t: Scalar) -> Vec3 {
    position + Vec3::new(0.0, 0.0, -1.0) * (num_steps as Scalar * delta_t * SPEED_OF_LIGHT)
}

/// Physical constants of a charged particle that the pusher reads.
///
/// `weighting` is carried for downstream accumulation and never read by
/// the integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Species {
    /// Rest mass.
    pub mass: Scalar,
    /// Electric charge.
    pub charge: Scalar,
    /// Macro-particle weighting.
    pub weighting: Scalar,
}

impl Species {
    /// Create a species from its mass, charge, and weighting.
    pub fn new(mass: Scalar, charge: Scalar, weighting: Scalar) -> Self {
        Self {
            mass,
            charge,
            weighting,
        }
    }
}

/// A passive tracer particle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    /// Current position.
    pub pos: Vec3,
    /// Particle identifier.
    pub id: ParticleId,
    /// Steps taken so far.
    pub num_steps: i64,
    /// Lifecycle flags.
    pub status: ParticleStatus,
    /// Elapsed time.
    pub time: Scalar,
}

impl Particle {
    /// Create a tracer at `pos` with zero steps, default status, and time 0.
    pub fn new(pos: Vec3, id: ParticleId) -> Self {
        Self {
            pos,
            id,
            num_steps: 0,
            status: ParticleStatus::default(),
            time: 0.0,
        }
    }

    /// Sum of the sizes of the stored fields, in bytes.
    ///
    /// Equal to the length of the serialized record.
    pub const fn sizeof() -> usize {
        size_of::<Vec3>() // pos
            + size_of::<i64>() // id
            + size_of::<i64>() // num_steps
            + size_of::<u8>() // status
            + size_of::<Scalar>() // time
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(Vec3::zeros(), ParticleId::UNASSIGNED)
    }
}

impl Advectable for Particle {
    fn evaluation_position(&self, _delta_t: Scalar) -> Vec3 {
        self.pos
    }

    fn velocity(&mut self, sample: &FieldSample, _length: Scalar) -> Result<Vec3, CoreError> {
        tracer_velocity(sample)
    }
}

impl fmt::Display for Particle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v({}) = [{}, {}, {}], ID: {}, NumSteps: {}, Status: {}",
            self.time, self.pos.x, self.pos.y, self.pos.z, self.id, self.num_steps, self.status
        )
    }
}

/// A relativistic charged particle pushed through electric and magnetic
/// fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChargedParticle {
    /// Current position.
    pub pos: Vec3,
    /// Particle identifier.
    pub id: ParticleId,
    /// Steps taken so far.
    pub num_steps: i64,
    /// Lifecycle flags.
    pub status: ParticleStatus,
    /// Elapsed time.
    pub time: Scalar,
    species: Species,
    momentum: Vec3,
}

impl ChargedParticle {
    /// Create a charged particle with zero steps, default status, and time 0.
    pub fn new(pos: Vec3, id: ParticleId, species: Species, momentum: Vec3) -> Self {
        Self {
            pos,
            id,
            num_steps: 0,
            status: ParticleStatus::default(),
            time: 0.0,
            species,
            momentum,
        }
    }

    /// Mass, charge, and weighting.
    pub fn species(&self) -> &Species {
        &self.species
    }

    /// Rest mass.
    pub fn mass(&self) -> Scalar {
        self.species.mass
    }

    /// Electric charge.
    pub fn charge(&self) -> Scalar {
        self.species.charge
    }

    /// Macro-particle weighting.
    pub fn weighting(&self) -> Scalar {
        self.species.weighting
    }

    /// Current momentum.
    pub fn momentum(&self) -> Vec3 {
        self.momentum
    }

    /// Relativistic factor of `momentum` for this particle's mass.
    pub fn gamma(&self, momentum: &Vec3, reciprocal: bool) -> Scalar {
        crate::pusher::gamma(momentum, self.species.mass, reciprocal)
    }

    /// Sum of the sizes of the stored fields, in bytes.
    ///
    /// The speed of light is a compile-time constant and is not counted.
    /// Equal to the length of the serialized record.
    pub const fn sizeof() -> usize {
        Particle::sizeof()
            + size_of::<Scalar>() // mass
            + size_of::<Scalar>() // charge
            + size_of::<Scalar>() // weighting
            + size_of::<Vec3>() // momentum
    }
}

impl Advectable for ChargedParticle {
    fn evaluation_position(&self, delta_t: Scalar) -> Vec3 {
        charged_evaluation_position(&self.pos, self.num_steps, delta_t)
    }

    fn velocity(&mut self, sample: &FieldSample, length: Scalar) -> Result<Vec3, CoreError> {
        charged_velocity(&mut self.momentum, &self.species, sample, length)
    }
}

impl fmt::Display for ChargedParticle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "v({}) = [{}, {}, {}], ID: {}, NumSteps: {}, Status: {}",
            self.time, self.pos.x, self.pos.y, self.pos.z, self.id, self.num_steps, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pusher::gamma;
    use smallvec::smallvec;

    fn proton() -> Species {
        Species::new(1.672_621_9e-27, 1.602_176_634e-19, 1.0)
    }

    #[test]
    fn tracer_velocity_is_sample_identity() {
        let mut p = Particle::new(Vec3::new(5.0, 6.0, 7.0), ParticleId(3));
        let v = Vec3::new(1.5, -2.0, 0.25);
        let sample: FieldSample = smallvec![v];
        assert_eq!(p.velocity(&sample, 0.1).unwrap(), v);
        // Particle state has no influence on the result.
        p.pos = Vec3::new(-100.0, 0.0, 0.0);
        p.num_steps = 99;
        assert_eq!(p.velocity(&sample, 7.0).unwrap(), v);
    }

    #[test]
    fn tracer_uses_first_of_several_vectors() {
        let first = Vec3::new(0.5, 0.0, -1.0);
        let sample: FieldSample = smallvec![first, Vec3::new(9.0, 9.0, 9.0)];
        assert_eq!(tracer_velocity(&sample).unwrap(), first);
    }

    #[test]
    fn tracer_rejects_empty_sample() {
        let mut p = Particle::default();
        let err = p.velocity(&FieldSample::new(), 0.1).unwrap_err();
        assert_eq!(
            err,
            CoreError::SampleArity {
                expected: 1,
                found: 0
            }
        );
    }

    #[test]
    fn tracer_evaluates_at_stored_position() {
        let mut p = Particle::new(Vec3::new(1.0, 2.0, 3.0), ParticleId(0));
        p.num_steps = 12;
        assert_eq!(p.evaluation_position(0.5), p.pos);
    }

    #[test]
    fn charged_requires_exactly_two_vectors() {
        let p0 = Vec3::new(1.0e-21, 0.0, 0.0);
        let mut cp = ChargedParticle::new(Vec3::zeros(), ParticleId(1), proton(), p0);
        let one: FieldSample = smallvec![Vec3::zeros()];
        let err = cp.velocity(&one, 1e-9).unwrap_err();
        assert_eq!(
            err,
            CoreError::SampleArity {
                expected: 2,
                found: 1
            }
        );
        assert_eq!(cp.momentum(), p0, "momentum must not move on arity failure");

        let mut three = FieldSample::new();
        three.extend([Vec3::zeros(), Vec3::zeros(), Vec3::zeros()]);
        assert!(cp.velocity(&three, 1e-9).is_err());
    }

    #[test]
    fn charged_zero_field_keeps_momentum() {
        let p0 = Vec3::new(1.0e-21, 2.0e-21, -5.0e-22);
        let mut cp = ChargedParticle::new(Vec3::zeros(), ParticleId(1), proton(), p0);
        let sample: FieldSample = smallvec![Vec3::zeros(), Vec3::zeros()];
        let v = cp.velocity(&sample, 1e-9).unwrap();
        assert_eq!(cp.momentum(), p0);
        let g = gamma(&p0, cp.mass(), false);
        let expected = p0 / (cp.mass() * g);
        assert!((v - expected).norm() <= 1e-12 * expected.norm());
    }

    #[test]
    fn charged_velocity_commits_momentum() {
        let mut cp = ChargedParticle::new(Vec3::zeros(), ParticleId(1), proton(), Vec3::zeros());
        let sample: FieldSample = smallvec![Vec3::new(0.0, 1.0e3, 0.0), Vec3::zeros()];
        cp.velocity(&sample, 1e-9).unwrap();
        assert!(cp.momentum().y > 0.0);
    }

    #[test]
    fn charged_evaluation_position_drifts_along_negative_z() {
        let mut cp = ChargedParticle::new(Vec3::new(1.0, 2.0, 3.0), ParticleId(1), proton(), Vec3::zeros());
        assert_eq!(cp.evaluation_position(1e-9), cp.pos);
        cp.num_steps = 4;
        let dt = 1e-9;
        let eval = cp.evaluation_position(dt);
        assert_eq!(eval.x, 1.0);
        assert_eq!(eval.y, 2.0);
        assert!((eval.z - (3.0 - 4.0 * dt * SPEED_OF_LIGHT)).abs() < 1e-12);
        assert_eq!(cp.pos, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn sizeof_is_sum_of_stored_fields() {
        assert_eq!(Particle::sizeof(), 24 + 8 + 8 + 1 + 8);
        assert_eq!(ChargedParticle::sizeof(), Particle::sizeof() + 3 * 8 + 24);
    }

    #[test]
    fn display_matches_record_layout() {
        let p = Particle::new(Vec3::new(1.0, 2.0, 3.0), ParticleId(7));
        assert_eq!(
            p.to_string(),
            "v(0) = [1, 2, 3], ID: 7, NumSteps: 0, Status: [ok= 1 term= 0 spat= 0 temp= 0 err= 0 ghst= 0]"
        );
    }
}
