//! Structure-of-arrays particle batches and the backends that step them.
//!
//! A batch owns index-aligned buffers (position, step count, status,
//! elapsed time, and momentum/species for charged batches). Preparing a
//! batch against a backend yields an execution view that lends each
//! particle's slots to exactly one kernel invocation.
//!
//! # Architecture
//!
//! ```text
//! ParticleBatch ──prepare(device)──► ParticleView<'_, D>
//!  ├── ParticleBuffers                 ├── ExecutionView (index ops)
//!  └── ChargedBuffers (optional)       └── for_each ──► Backend::dispatch
//!                                                        └── ParticleLane × N
//! RecordingBatch ──prepare(device)──► RecordingView<'_, D>
//!  ├── ParticleBatch                   └── RecordingLane × N
//!  └── history + valid (N × max_steps)       (take_step also records)
//! ```
//!
//! # Backends
//!
//! - **Serial:** one thread, index order.
//! - **MultiCore:** recursive halving on the rayon pool.
//! - **Simt:** fixed-width blocks, one task per block.
//!
//! Lanes never alias: every partition is built from `split_at_mut`, so a
//! kernel can only reach the slots of the particle it was handed.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod backend;
pub mod batch;
pub mod copy;
pub mod error;
pub mod lane;
pub mod view;

pub use backend::{Backend, Device, MultiCore, Partition, Serial, Simt};
pub use batch::{ChargedBuffers, ParticleBatch, ParticleBuffers, RecordingBatch};
pub use copy::{copy_components, copy_positions, ParticleComponents, ParticleRecord};
pub use error::BatchError;
pub use lane::{Lane, ParticleLane, RecordingLane};
pub use view::{ExecutionView, ParticleView, RecordingView};
