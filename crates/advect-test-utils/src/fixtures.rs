//! Seeded particle fixtures.
//!
//! All generators draw from a [`ChaCha8Rng`] so the same seed yields the
//! same particles on every platform.

use advect_core::{ChargedParticle, Particle, ParticleId, Scalar, Species, Vec3, SPEED_OF_LIGHT};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Deterministic generator for `seed`.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Electron: rest mass, charge, unit weighting.
pub fn electron() -> Species {
    Species::new(9.109_383_7e-31, -1.602_176_634e-19, 1.0)
}

/// Proton: rest mass, charge, unit weighting.
pub fn proton() -> Species {
    Species::new(1.672_621_9e-27, 1.602_176_634e-19, 1.0)
}

/// Axis-aligned box particles are seeded inside.
#[derive(Clone, Copy, Debug)]
pub struct ParticleCloud {
    pub min: Vec3,
    pub max: Vec3,
}

impl ParticleCloud {
    /// Cube `[-half, half]³`.
    pub fn cube(half: Scalar) -> Self {
        Self {
            min: Vec3::repeat(-half),
            max: Vec3::repeat(half),
        }
    }

    fn draw(&self, rng: &mut ChaCha8Rng) -> Vec3 {
        Vec3::new(
            rng.random_range(self.min.x..=self.max.x),
            rng.random_range(self.min.y..=self.max.y),
            rng.random_range(self.min.z..=self.max.z),
        )
    }
}

/// `n` fresh tracers inside `cloud`, with IDs `0..n`.
pub fn random_particles(seed: u64, n: usize, cloud: ParticleCloud) -> Vec<Particle> {
    let mut rng = seeded_rng(seed);
    (0..n)
        .map(|i| Particle::new(cloud.draw(&mut rng), ParticleId(i as i64)))
        .collect()
}

/// `n` fresh charged particles of `species` inside `cloud`, with IDs
/// `0..n` and momenta up to `max_beta · m · c` per component.
pub fn random_charged_particles(
    seed: u64,
    n: usize,
    cloud: ParticleCloud,
    species: Species,
    max_beta: Scalar,
) -> Vec<ChargedParticle> {
    let mut rng = seeded_rng(seed);
    let p_max = max_beta * species.mass * SPEED_OF_LIGHT;
    (0..n)
        .map(|i| {
            let pos = cloud.draw(&mut rng);
            let momentum = Vec3::new(
                rng.random_range(-p_max..=p_max),
                rng.random_range(-p_max..=p_max),
                rng.random_range(-p_max..=p_max),
            );
            ChargedParticle::new(pos, ParticleId(i as i64), species, momentum)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_particles() {
        let cloud = ParticleCloud::cube(2.0);
        assert_eq!(random_particles(7, 16, cloud), random_particles(7, 16, cloud));
        assert_ne!(random_particles(7, 16, cloud), random_particles(8, 16, cloud));
    }

    #[test]
    fn particles_stay_inside_the_cloud() {
        let cloud = ParticleCloud::cube(0.5);
        for p in random_charged_particles(3, 64, cloud, electron(), 0.1) {
            assert!(p.pos.iter().all(|c| (-0.5..=0.5).contains(c)));
            assert!(p.momentum().norm() <= 0.1 * electron().mass * SPEED_OF_LIGHT * 3f64.sqrt());
        }
    }
}
