//! Analytic field samplers and seeded particle fixtures for Advect
//! development.
//!
//! Every sampler here has a closed-form field, so tests can check stepped
//! trajectories against exact answers:
//!
//! - [`UniformField`]: constant velocity.
//! - [`UniformEmField`]: constant electric and magnetic fields.
//! - [`RotatingField`]: rigid rotation about the z axis.
//! - [`MalformedField`]: returns a sample of the wrong arity.
//! - [`CountingField`]: wraps another sampler and counts calls.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{
    electron, proton, random_charged_particles, random_particles, seeded_rng, ParticleCloud,
};

use std::sync::atomic::{AtomicUsize, Ordering};

use advect_core::{FieldSample, FieldSampler, Scalar, Vec3};
use smallvec::smallvec;

/// Constant velocity everywhere.
#[derive(Clone, Copy, Debug)]
pub struct UniformField(pub Vec3);

impl FieldSampler for UniformField {
    fn sample(&self, _position: &Vec3, _step_length: Scalar) -> FieldSample {
        smallvec![self.0]
    }
}

/// Constant electric and magnetic fields, sampled as `[E, B]`.
#[derive(Clone, Copy, Debug)]
pub struct UniformEmField {
    pub e: Vec3,
    pub b: Vec3,
}

impl UniformEmField {
    pub fn new(e: Vec3, b: Vec3) -> Self {
        Self { e, b }
    }

    /// Pure magnetic field along z.
    pub fn magnetic_z(bz: Scalar) -> Self {
        Self::new(Vec3::zeros(), Vec3::new(0.0, 0.0, bz))
    }
}

impl FieldSampler for UniformEmField {
    fn sample(&self, _position: &Vec3, _step_length: Scalar) -> FieldSample {
        smallvec![self.e, self.b]
    }
}

/// Rigid rotation with angular velocity `omega` about the z axis through
/// the origin: `v = ω ẑ × p`.
#[derive(Clone, Copy, Debug)]
pub struct RotatingField {
    pub omega: Scalar,
}

impl FieldSampler for RotatingField {
    fn sample(&self, position: &Vec3, _step_length: Scalar) -> FieldSample {
        smallvec![Vec3::new(-self.omega * position.y, self.omega * position.x, 0.0)]
    }
}

/// Returns `arity` zero vectors, for exercising arity checks.
#[derive(Clone, Copy, Debug)]
pub struct MalformedField {
    pub arity: usize,
}

impl FieldSampler for MalformedField {
    fn sample(&self, _position: &Vec3, _step_length: Scalar) -> FieldSample {
        (0..self.arity).map(|_| Vec3::zeros()).collect()
    }
}

/// Forwards to `inner` and counts every call.
#[derive(Debug)]
pub struct CountingField<S> {
    pub inner: S,
    calls: AtomicUsize,
}

impl<S> CountingField<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `sample` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl<S: FieldSampler> FieldSampler for CountingField<S> {
    fn sample(&self, position: &Vec3, step_length: Scalar) -> FieldSample {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.inner.sample(position, step_length)
    }
}
