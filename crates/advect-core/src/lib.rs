//! Core types and traits for the Advect particle engine.
//!
//! This is the leaf crate with no internal dependencies. It defines the
//! per-particle building blocks shared by every execution backend:
//! numeric types and IDs, the [`ParticleStatus`] flag set, the two particle
//! records, the relativistic pusher, and the field-sampler contract.
//!
//! # Per-particle update
//!
//! ```text
//! eval  = particle.evaluation_position(h)
//! field = sampler.sample(eval, h)          // 1 vector (tracer) or E, B (charged)
//! v     = particle.velocity(&field, h)?    // charged: also commits new momentum
//! pos  += v * h
//! ```
//!
//! The same [`Advectable`] logic runs on owned records and on batch-resident
//! lanes (see `advect-batch`).

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod id;
pub mod particle;
pub mod pusher;
pub mod status;
pub mod traits;

pub use error::CoreError;
pub use id::{ParticleId, Scalar, Vec3, SPEED_OF_LIGHT};
pub use particle::{ChargedParticle, FieldSample, Particle, Species};
pub use pusher::{boris_push, gamma};
pub use status::ParticleStatus;
pub use traits::{Advectable, FieldSampler};
