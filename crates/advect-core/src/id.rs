//! Numeric aliases, physical constants, and the [`ParticleId`] newtype.

use std::fmt;

/// Floating-point type used for positions, time, and physical quantities.
///
/// Double precision: the relativistic factor squares both the rest mass and
/// the speed of light, and `m²c²` underflows `f32` for electron-scale masses.
pub type Scalar = f64;

/// Three-component vector for positions, velocities, momenta, and fields.
pub type Vec3 = nalgebra::Vector3<Scalar>;

/// Speed of light in vacuum, in m/s.
///
/// A compile-time constant. Never stored per particle and never serialized.
pub const SPEED_OF_LIGHT: Scalar = 2.997_924_58e8;

/// Identifies a particle across batches, copies, and serialized payloads.
///
/// `ParticleId(-1)` (the default) marks a record that was never assigned an ID.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParticleId(pub i64);

impl ParticleId {
    /// The ID carried by default-constructed records.
    pub const UNASSIGNED: Self = Self(-1);
}

impl Default for ParticleId {
    fn default() -> Self {
        Self::UNASSIGNED
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ParticleId {
    fn from(v: i64) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_id_is_unassigned() {
        assert_eq!(ParticleId::default(), ParticleId(-1));
    }

    #[test]
    fn display_is_bare_integer() {
        assert_eq!(ParticleId(42).to_string(), "42");
    }
}
