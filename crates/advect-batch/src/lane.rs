//! Per-lane handles and the slice partitions they are carved from.
//!
//! A lane is one particle's slots across the batch buffers, borrowed
//! mutably for the duration of a kernel invocation.

use advect_core::particle::{charged_evaluation_position, charged_velocity, tracer_velocity};
use advect_core::{Advectable, CoreError, FieldSample, ParticleStatus, Scalar, Species, Vec3};

use crate::backend::Partition;

/// Mutable access to one particle during a kernel.
///
/// The status transitions mirror [`ParticleStatus`]'s execution-level
/// methods; the queries mirror its predicates.
pub trait Lane: Advectable {
    /// Global index of this particle in its batch.
    fn index(&self) -> usize;
    /// Current position.
    fn pos(&self) -> Vec3;
    /// Steps taken so far.
    fn steps(&self) -> i64;
    /// Elapsed time.
    fn time(&self) -> Scalar;
    /// Lifecycle flags.
    fn status(&self) -> ParticleStatus;
    /// Mutable lifecycle flags.
    fn status_mut(&mut self) -> &mut ParticleStatus;
    /// Overwrite the elapsed time.
    fn set_time(&mut self, time: Scalar);
    /// Commit `pt` as the new position and count one step. Reaching the
    /// batch's step limit exactly marks the particle terminated.
    fn take_step(&mut self, pt: Vec3);

    /// Reset the status to only `OK`.
    fn set_ok(&mut self) {
        self.status_mut().reset_ok();
    }
    /// Clear `OK`, set `TERMINATED`.
    fn set_terminated(&mut self) {
        self.status_mut().mark_terminated();
    }
    /// Clear `OK`, set `SPATIAL_BOUNDS`.
    fn set_exit_spatial_boundary(&mut self) {
        self.status_mut().mark_exit_spatial_boundary();
    }
    /// Clear `OK`, set `TEMPORAL_BOUNDS`.
    fn set_exit_temporal_boundary(&mut self) {
        self.status_mut().mark_exit_temporal_boundary();
    }
    /// Clear `OK`, set `ERROR`.
    fn set_error(&mut self) {
        self.status_mut().mark_error();
    }
    /// Assign `TOOK_ANY_STEPS`.
    fn set_took_any_steps(&mut self, value: bool) {
        self.status_mut().assign_took_any_steps(value);
    }

    /// `OK` is set.
    fn ok(&self) -> bool {
        self.status().check_ok()
    }
    /// `TERMINATED` is set.
    fn terminated(&self) -> bool {
        self.status().check_terminate()
    }
    /// `SPATIAL_BOUNDS` is set.
    fn exit_spatial_boundary(&self) -> bool {
        self.status().check_spatial_bounds()
    }
    /// `TEMPORAL_BOUNDS` is set.
    fn exit_temporal_boundary(&self) -> bool {
        self.status().check_temporal_bounds()
    }
    /// `ERROR` is set.
    fn error(&self) -> bool {
        self.status().check_error()
    }
    /// See [`ParticleStatus::is_integrateable`].
    fn integrateable(&self) -> bool {
        self.status().is_integrateable()
    }
    /// See [`ParticleStatus::is_done`].
    fn done(&self) -> bool {
        self.status().is_done()
    }
}

/// One particle of a [`ParticleBatch`](crate::ParticleBatch).
pub struct ParticleLane<'a> {
    index: usize,
    max_steps: i64,
    pos: &'a mut Vec3,
    steps: &'a mut i64,
    status: &'a mut ParticleStatus,
    time: &'a mut Scalar,
    charge: Option<(&'a mut Vec3, &'a Species)>,
}

impl ParticleLane<'_> {
    /// Momentum, for charged batches.
    pub fn momentum(&self) -> Option<Vec3> {
        self.charge.as_ref().map(|(m, _)| **m)
    }

    /// Species constants, for charged batches.
    pub fn species(&self) -> Option<&Species> {
        self.charge.as_ref().map(|(_, s)| *s)
    }
}

impl Advectable for ParticleLane<'_> {
    fn evaluation_position(&self, delta_t: Scalar) -> Vec3 {
        match self.charge {
            Some(_) => charged_evaluation_position(&*self.pos, *self.steps, delta_t),
            None => *self.pos,
        }
    }

    fn velocity(&mut self, sample: &FieldSample, length: Scalar) -> Result<Vec3, CoreError> {
        match &mut self.charge {
            Some((momentum, species)) => charged_velocity(momentum, species, sample, length),
            None => tracer_velocity(sample),
        }
    }
}

impl Lane for ParticleLane<'_> {
    fn index(&self) -> usize {
        self.index
    }

    fn pos(&self) -> Vec3 {
        *self.pos
    }

    fn steps(&self) -> i64 {
        *self.steps
    }

    fn time(&self) -> Scalar {
        *self.time
    }

    fn status(&self) -> ParticleStatus {
        *self.status
    }

    fn status_mut(&mut self) -> &mut ParticleStatus {
        &mut *self.status
    }

    fn set_time(&mut self, time: Scalar) {
        *self.time = time;
    }

    fn take_step(&mut self, pt: Vec3) {
        *self.pos = pt;
        *self.steps = self.steps.saturating_add(1);
        if *self.steps == self.max_steps {
            self.status.mark_terminated();
        }
    }
}

/// One particle of a [`RecordingBatch`](crate::RecordingBatch): a
/// [`ParticleLane`] plus its row of trajectory slots.
pub struct RecordingLane<'a> {
    base: ParticleLane<'a>,
    history: &'a mut [Vec3],
    valid: &'a mut [bool],
}

impl RecordingLane<'_> {
    /// The particle's trajectory slots, slot `k` holding the position after
    /// step `k + 1`.
    pub fn history(&self) -> &[Vec3] {
        &*self.history
    }

    /// Which trajectory slots have been written.
    pub fn valid(&self) -> &[bool] {
        &*self.valid
    }

    /// Momentum, for charged batches.
    pub fn momentum(&self) -> Option<Vec3> {
        self.base.momentum()
    }

    /// Species constants, for charged batches.
    pub fn species(&self) -> Option<&Species> {
        self.base.species()
    }
}

impl Advectable for RecordingLane<'_> {
    fn evaluation_position(&self, delta_t: Scalar) -> Vec3 {
        self.base.evaluation_position(delta_t)
    }

    fn velocity(&mut self, sample: &FieldSample, length: Scalar) -> Result<Vec3, CoreError> {
        self.base.velocity(sample, length)
    }
}

impl Lane for RecordingLane<'_> {
    fn index(&self) -> usize {
        self.base.index()
    }

    fn pos(&self) -> Vec3 {
        self.base.pos()
    }

    fn steps(&self) -> i64 {
        self.base.steps()
    }

    fn time(&self) -> Scalar {
        self.base.time()
    }

    fn status(&self) -> ParticleStatus {
        self.base.status()
    }

    fn status_mut(&mut self) -> &mut ParticleStatus {
        self.base.status_mut()
    }

    fn set_time(&mut self, time: Scalar) {
        self.base.set_time(time);
    }

    /// Also writes `pt` to slot `steps - 1` of the trajectory row. Steps
    /// past the end of the row are not recorded.
    fn take_step(&mut self, pt: Vec3) {
        self.base.take_step(pt);
        let Ok(slot) = usize::try_from(self.base.steps() - 1) else {
            return;
        };
        if let (Some(h), Some(v)) = (self.history.get_mut(slot), self.valid.get_mut(slot)) {
            *h = pt;
            *v = true;
        }
    }
}

// ── Partitions ──────────────────────────────────────────────────

pub(crate) struct ChargeSlices<'a> {
    pub(crate) momentum: &'a mut [Vec3],
    pub(crate) species: &'a [Species],
}

impl ChargeSlices<'_> {
    fn reborrow(&mut self) -> ChargeSlices<'_> {
        ChargeSlices {
            momentum: &mut *self.momentum,
            species: self.species,
        }
    }
}

/// Disjoint window over the core particle buffers.
pub(crate) struct ParticleSlices<'a> {
    pub(crate) offset: usize,
    pub(crate) max_steps: i64,
    pub(crate) pos: &'a mut [Vec3],
    pub(crate) steps: &'a mut [i64],
    pub(crate) status: &'a mut [ParticleStatus],
    pub(crate) time: &'a mut [Scalar],
    pub(crate) charge: Option<ChargeSlices<'a>>,
}

impl ParticleSlices<'_> {
    pub(crate) fn lane(&mut self, i: usize) -> ParticleLane<'_> {
        ParticleLane {
            index: self.offset + i,
            max_steps: self.max_steps,
            pos: &mut self.pos[i],
            steps: &mut self.steps[i],
            status: &mut self.status[i],
            time: &mut self.time[i],
            charge: self
                .charge
                .as_mut()
                .map(|c| (&mut c.momentum[i], &c.species[i])),
        }
    }

    pub(crate) fn reborrow(&mut self) -> ParticleSlices<'_> {
        ParticleSlices {
            offset: self.offset,
            max_steps: self.max_steps,
            pos: &mut *self.pos,
            steps: &mut *self.steps,
            status: &mut *self.status,
            time: &mut *self.time,
            charge: self.charge.as_mut().map(ChargeSlices::reborrow),
        }
    }
}

impl Partition for ParticleSlices<'_> {
    fn len(&self) -> usize {
        self.pos.len()
    }

    fn split_at(self, mid: usize) -> (Self, Self) {
        let (pos_l, pos_r) = self.pos.split_at_mut(mid);
        let (steps_l, steps_r) = self.steps.split_at_mut(mid);
        let (status_l, status_r) = self.status.split_at_mut(mid);
        let (time_l, time_r) = self.time.split_at_mut(mid);
        let (charge_l, charge_r) = match self.charge {
            Some(c) => {
                let (m_l, m_r) = c.momentum.split_at_mut(mid);
                let (s_l, s_r) = c.species.split_at(mid);
                (
                    Some(ChargeSlices {
                        momentum: m_l,
                        species: s_l,
                    }),
                    Some(ChargeSlices {
                        momentum: m_r,
                        species: s_r,
                    }),
                )
            }
            None => (None, None),
        };
        (
            ParticleSlices {
                offset: self.offset,
                max_steps: self.max_steps,
                pos: pos_l,
                steps: steps_l,
                status: status_l,
                time: time_l,
                charge: charge_l,
            },
            ParticleSlices {
                offset: self.offset + mid,
                max_steps: self.max_steps,
                pos: pos_r,
                steps: steps_r,
                status: status_r,
                time: time_r,
                charge: charge_r,
            },
        )
    }
}

/// [`ParticleSlices`] plus the matching trajectory rows, `width` slots per
/// particle.
pub(crate) struct RecordingSlices<'a> {
    pub(crate) base: ParticleSlices<'a>,
    pub(crate) width: usize,
    pub(crate) history: &'a mut [Vec3],
    pub(crate) valid: &'a mut [bool],
}

impl RecordingSlices<'_> {
    pub(crate) fn lane(&mut self, i: usize) -> RecordingLane<'_> {
        let row = i * self.width..(i + 1) * self.width;
        RecordingLane {
            base: self.base.lane(i),
            history: &mut self.history[row.clone()],
            valid: &mut self.valid[row],
        }
    }

    pub(crate) fn reborrow(&mut self) -> RecordingSlices<'_> {
        RecordingSlices {
            base: self.base.reborrow(),
            width: self.width,
            history: &mut *self.history,
            valid: &mut *self.valid,
        }
    }
}

impl Partition for RecordingSlices<'_> {
    fn len(&self) -> usize {
        self.base.len()
    }

    fn split_at(self, mid: usize) -> (Self, Self) {
        let (base_l, base_r) = self.base.split_at(mid);
        let (hist_l, hist_r) = self.history.split_at_mut(mid * self.width);
        let (valid_l, valid_r) = self.valid.split_at_mut(mid * self.width);
        (
            RecordingSlices {
                base: base_l,
                width: self.width,
                history: hist_l,
                valid: valid_l,
            },
            RecordingSlices {
                base: base_r,
                width: self.width,
                history: hist_r,
                valid: valid_r,
            },
        )
    }
}
