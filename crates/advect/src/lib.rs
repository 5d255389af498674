//! Advect: particle advection through sampled vector fields.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Advect sub-crates. For most users, adding `advect` as a single dependency
//! is sufficient.
//!
//! # Quick start
//!
//! ```rust
//! use advect::prelude::*;
//!
//! // Solid-body rotation about z.
//! struct Vortex;
//! impl FieldSampler for Vortex {
//!     fn sample(&self, p: &Vec3, _h: Scalar) -> FieldSample {
//!         [Vec3::new(-p.y, p.x, 0.0)].into_iter().collect()
//!     }
//! }
//!
//! let config = AdvectConfig {
//!     step_length: 0.01,
//!     max_steps: 100,
//!     ..Default::default()
//! };
//! let advector = Advector::new(config, Vortex).unwrap();
//!
//! let mut seeds = vec![Particle::new(Vec3::new(1.0, 0.0, 0.0), ParticleId(0))];
//! let metrics = advector.advance_particles(&mut seeds).unwrap();
//! assert_eq!(metrics.steps_taken, 100);
//! assert!(seeds[0].status.check_terminate());
//! assert!(seeds[0].pos.y > 0.0);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `advect-core` | Records, status flags, field sampler trait, Boris pusher |
//! | [`batch`] | `advect-batch` | SoA batches, backends, execution views |
//! | [`codec`] | `advect-codec` | Binary record format and streams |
//! | [`engine`] | `advect-engine` | Reference stepper, configuration, run metrics |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Particle records, status flags, and pushers (`advect-core`).
///
/// Contains [`types::Particle`], [`types::ChargedParticle`], the
/// [`types::FieldSampler`] trait, and [`types::boris_push`].
pub use advect_core as types;

/// Batches, backends, and execution views (`advect-batch`).
///
/// [`batch::ParticleBatch`] and [`batch::RecordingBatch`] own the particle
/// buffers; [`batch::Device`] selects how kernels are dispatched.
pub use advect_batch as batch;

/// Binary wire format (`advect-codec`).
///
/// Write record streams with [`codec::RecordWriter`], read them back with
/// [`codec::RecordReader`].
pub use advect_codec as codec;

/// Reference stepper (`advect-engine`).
///
/// [`engine::Advector`] drives batches through a sampler under an
/// [`engine::AdvectConfig`].
pub use advect_engine as engine;

/// Common imports for typical Advect usage.
///
/// ```rust
/// use advect::prelude::*;
/// ```
///
/// This imports records, the sampler trait, batches, backends, and the
/// stepper with its configuration.
pub mod prelude {
    // Records and traits
    pub use advect_core::{
        Advectable, ChargedParticle, FieldSample, FieldSampler, Particle, ParticleId,
        ParticleStatus, Scalar, Species, Vec3,
    };

    // Batches and backends
    pub use advect_batch::{
        Device, ExecutionView, Lane, MultiCore, ParticleBatch, ParticleBuffers, RecordingBatch,
        Serial, Simt,
    };

    // Errors
    pub use advect_batch::BatchError;
    pub use advect_codec::CodecError;
    pub use advect_core::CoreError;
    pub use advect_engine::{AdvectError, ConfigError};

    // Engine
    pub use advect_engine::{AdvectConfig, Advector, Bounds, DeviceKind, RunMetrics};
}
