//! Reference stepper driving Advect particle batches through sampled
//! fields.
//!
//! Provides the [`Advector`], which repeatedly dispatches the per-particle
//! update over a batch on the configured backend until every particle is
//! done, and the validated [`AdvectConfig`] it runs from.
//!
//! # Example
//!
//! ```
//! use advect_core::{FieldSample, Particle, ParticleId, Scalar, Vec3};
//! use advect_engine::{AdvectConfig, Advector};
//!
//! let wind = |_: &Vec3, _: Scalar| -> FieldSample { [Vec3::new(1.0, 0.0, 0.0)].into_iter().collect() };
//! let config = AdvectConfig { step_length: 0.25, max_steps: 8, ..Default::default() };
//! let advector = Advector::new(config, wind).unwrap();
//!
//! let mut particles = vec![Particle::new(Vec3::zeros(), ParticleId(0))];
//! let metrics = advector.advance_particles(&mut particles).unwrap();
//! assert_eq!(metrics.steps_taken, 8);
//! assert_eq!(particles[0].pos, Vec3::new(2.0, 0.0, 0.0));
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod advector;
pub mod config;
pub mod error;
pub mod metrics;

pub use advector::Advector;
pub use config::{AdvectConfig, Bounds, ConfigError, DeviceKind};
pub use error::AdvectError;
pub use metrics::RunMetrics;
