//! Flattening particle record arrays into per-component arrays.

use advect_core::{ChargedParticle, Particle, ParticleId, ParticleStatus, Scalar, Vec3};

/// Fields shared by every particle record.
pub trait ParticleRecord {
    /// Current position.
    fn pos(&self) -> Vec3;
    /// Identifier.
    fn id(&self) -> ParticleId;
    /// Steps taken so far.
    fn num_steps(&self) -> i64;
    /// Lifecycle flags.
    fn status(&self) -> ParticleStatus;
    /// Elapsed time.
    fn time(&self) -> Scalar;
}

impl ParticleRecord for Particle {
    fn pos(&self) -> Vec3 {
        self.pos
    }
    fn id(&self) -> ParticleId {
        self.id
    }
    fn num_steps(&self) -> i64 {
        self.num_steps
    }
    fn status(&self) -> ParticleStatus {
        self.status
    }
    fn time(&self) -> Scalar {
        self.time
    }
}

impl ParticleRecord for ChargedParticle {
    fn pos(&self) -> Vec3 {
        self.pos
    }
    fn id(&self) -> ParticleId {
        self.id
    }
    fn num_steps(&self) -> i64 {
        self.num_steps
    }
    fn status(&self) -> ParticleStatus {
        self.status
    }
    fn time(&self) -> Scalar {
        self.time
    }
}

/// Per-component copy of a record array, index-aligned with its source.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleComponents {
    /// Positions.
    pub positions: Vec<Vec3>,
    /// Identifiers.
    pub ids: Vec<ParticleId>,
    /// Step counts.
    pub steps: Vec<i64>,
    /// Status flags.
    pub status: Vec<ParticleStatus>,
    /// Elapsed times.
    pub time: Vec<Scalar>,
}

/// Positions of `records`, in order.
pub fn copy_positions<P: ParticleRecord>(records: &[P]) -> Vec<Vec3> {
    records.iter().map(ParticleRecord::pos).collect()
}

/// Every shared component of `records`, in order.
pub fn copy_components<P: ParticleRecord>(records: &[P]) -> ParticleComponents {
    let mut out = ParticleComponents {
        positions: Vec::with_capacity(records.len()),
        ids: Vec::with_capacity(records.len()),
        steps: Vec::with_capacity(records.len()),
        status: Vec::with_capacity(records.len()),
        time: Vec::with_capacity(records.len()),
    };
    for r in records {
        out.positions.push(r.pos());
        out.ids.push(r.id());
        out.steps.push(r.num_steps());
        out.status.push(r.status());
        out.time.push(r.time());
    }
    out
}
