//! Benchmark profiles for the Advect particle advection engine.
//!
//! Provides pre-built workloads for benchmarking:
//!
//! - [`Dipole`]: a cheap analytic magnetic dipole with a weak uniform E
//! - [`reference_tracers`]: 10K tracers in a unit cube
//! - [`reference_electrons`]: 10K electrons at up to 0.5c
//! - [`reference_config`]: step length, limits, and bounds for a device

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use advect_batch::{BatchError, ParticleBatch, RecordingBatch};
use advect_core::{ChargedParticle, FieldSample, FieldSampler, Particle, Scalar, Vec3};
use advect_engine::{AdvectConfig, Bounds, DeviceKind};
use advect_test_utils::{electron, random_charged_particles, random_particles, ParticleCloud};
use smallvec::smallvec;

/// Particle count used by the reference profiles.
pub const REFERENCE_COUNT: usize = 10_000;

/// Step limit used by the reference profiles.
pub const REFERENCE_STEPS: i64 = 100;

/// Point dipole at the origin along `z`, plus a uniform electric field.
///
/// Returns `[E, B]`, so it serves both tracers (which read only the
/// first vector as velocity) and charged particles.
#[derive(Clone, Copy, Debug)]
pub struct Dipole {
    /// Dipole strength.
    pub moment: Scalar,
    /// Uniform electric field.
    pub e: Vec3,
}

impl Default for Dipole {
    fn default() -> Self {
        Self {
            moment: 1.0e-6,
            e: Vec3::new(0.0, 0.0, 1.0e2),
        }
    }
}

impl FieldSampler for Dipole {
    fn sample(&self, position: &Vec3, _step_length: Scalar) -> FieldSample {
        let r2 = position.norm_squared().max(1.0e-12);
        let r = r2.sqrt();
        let m = Vec3::new(0.0, 0.0, self.moment);
        let rhat = position / r;
        let b = (rhat * (3.0 * rhat.dot(&m)) - m) / (r2 * r);
        smallvec![self.e, b]
    }
}

/// 10K tracers uniformly placed in `[-1, 1]^3`.
pub fn reference_tracers(seed: u64) -> Vec<Particle> {
    random_particles(seed, REFERENCE_COUNT, ParticleCloud::cube(1.0))
}

/// 10K electrons in `[-1, 1]^3` with speeds up to half the speed of light.
pub fn reference_electrons(seed: u64) -> Vec<ChargedParticle> {
    random_charged_particles(
        seed,
        REFERENCE_COUNT,
        ParticleCloud::cube(1.0),
        electron(),
        0.5,
    )
}

/// Reference run configuration on `device`, with a step length suited to
/// the particle kind.
pub fn reference_config(device: DeviceKind, charged: bool) -> AdvectConfig {
    AdvectConfig {
        step_length: if charged { 1.0e-12 } else { 1.0e-3 },
        max_steps: REFERENCE_STEPS,
        bounds: Some(Bounds::new(Vec3::repeat(-10.0), Vec3::repeat(10.0))),
        device,
        ..Default::default()
    }
}

/// The backends every throughput bench is repeated on.
pub fn bench_devices() -> [(&'static str, DeviceKind); 3] {
    [
        ("serial", DeviceKind::Serial),
        ("multicore", DeviceKind::MultiCore { grain: 256 }),
        ("simt", DeviceKind::Simt { block_dim: 128 }),
    ]
}

/// Fresh tracer batch for the reference profile.
pub fn tracer_batch(seed: u64) -> Result<ParticleBatch, BatchError> {
    ParticleBatch::from_particles(&reference_tracers(seed), REFERENCE_STEPS)
}

/// Fresh recording batch for the reference profile.
pub fn recording_batch(seed: u64) -> Result<RecordingBatch, BatchError> {
    RecordingBatch::from_batch(tracer_batch(seed)?)
}

/// Fresh charged batch for the reference profile.
pub fn electron_batch(seed: u64) -> Result<ParticleBatch, BatchError> {
    ParticleBatch::from_charged_particles(&reference_electrons(seed), REFERENCE_STEPS)
}
