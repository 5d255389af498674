//! Batch storage: index-aligned particle buffers and their owners.

use advect_core::{
    ChargedParticle, Particle, ParticleId, ParticleStatus, Scalar, Species, Vec3,
};

use crate::backend::Backend;
use crate::error::BatchError;
use crate::lane::{ChargeSlices, ParticleSlices, RecordingSlices};
use crate::view::{ParticleView, RecordingView};

/// Core per-particle buffers. Slot `i` of every buffer belongs to
/// particle `i`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleBuffers {
    /// Positions.
    pub positions: Vec<Vec3>,
    /// Steps taken so far.
    pub steps: Vec<i64>,
    /// Lifecycle flags.
    pub status: Vec<ParticleStatus>,
    /// Elapsed time.
    pub time: Vec<Scalar>,
}

impl ParticleBuffers {
    /// Buffers for fresh particles at `positions`: zero steps, `OK` status,
    /// time 0.
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        let n = positions.len();
        Self {
            positions,
            steps: vec![0; n],
            status: vec![ParticleStatus::default(); n],
            time: vec![0.0; n],
        }
    }

    /// Number of particles, taken from the position buffer.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the position buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn validate(&self) -> Result<(), BatchError> {
        let expected = self.len();
        check_len("steps", expected, self.steps.len())?;
        check_len("status", expected, self.status.len())?;
        check_len("time", expected, self.time.len())?;
        if let Some((index, &steps)) = self.steps.iter().enumerate().find(|(_, &s)| s < 0) {
            return Err(BatchError::NegativeStepCount { index, steps });
        }
        Ok(())
    }
}

/// Extra buffers carried by charged batches.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChargedBuffers {
    /// Momenta, advanced in place by the pusher.
    pub momentum: Vec<Vec3>,
    /// Mass, charge, and weighting.
    pub species: Vec<Species>,
}

impl ChargedBuffers {
    fn validate(&self, expected: usize) -> Result<(), BatchError> {
        check_len("momentum", expected, self.momentum.len())?;
        check_len("species", expected, self.species.len())?;
        for (index, s) in self.species.iter().enumerate() {
            if !(s.mass.is_finite() && s.mass > 0.0) {
                return Err(BatchError::InvalidMass {
                    index,
                    mass: s.mass,
                });
            }
        }
        Ok(())
    }
}

fn check_len(buffer: &'static str, expected: usize, found: usize) -> Result<(), BatchError> {
    if expected == found {
        Ok(())
    } else {
        Err(BatchError::LengthMismatch {
            buffer,
            expected,
            found,
        })
    }
}

/// A fixed-size set of particles held as parallel buffers.
///
/// The batch owns its buffers. [`prepare`](Self::prepare) lends them to an
/// execution view for one unit of work; the view's `&mut` borrow keeps a
/// second view from existing at the same time.
#[derive(Clone, Debug, PartialEq)]
pub struct ParticleBatch {
    buffers: ParticleBuffers,
    charge: Option<ChargedBuffers>,
    max_steps: i64,
}

impl ParticleBatch {
    /// Take ownership of `buffers` as a tracer batch.
    ///
    /// # Errors
    ///
    /// [`BatchError::LengthMismatch`] if the buffers differ in length,
    /// [`BatchError::NegativeMaxSteps`] or
    /// [`BatchError::NegativeStepCount`] for negative counts.
    pub fn new(buffers: ParticleBuffers, max_steps: i64) -> Result<Self, BatchError> {
        if max_steps < 0 {
            return Err(BatchError::NegativeMaxSteps { max_steps });
        }
        buffers.validate()?;
        Ok(Self {
            buffers,
            charge: None,
            max_steps,
        })
    }

    /// Attach momentum and species buffers, turning this into a charged
    /// batch.
    ///
    /// # Errors
    ///
    /// [`BatchError::LengthMismatch`] or [`BatchError::InvalidMass`].
    pub fn with_charge(mut self, charge: ChargedBuffers) -> Result<Self, BatchError> {
        charge.validate(self.len())?;
        self.charge = Some(charge);
        Ok(self)
    }

    /// Scatter tracer records into a new batch. IDs are not stored.
    pub fn from_particles(particles: &[Particle], max_steps: i64) -> Result<Self, BatchError> {
        let buffers = ParticleBuffers {
            positions: particles.iter().map(|p| p.pos).collect(),
            steps: particles.iter().map(|p| p.num_steps).collect(),
            status: particles.iter().map(|p| p.status).collect(),
            time: particles.iter().map(|p| p.time).collect(),
        };
        Self::new(buffers, max_steps)
    }

    /// Scatter charged records into a new charged batch. IDs are not
    /// stored.
    pub fn from_charged_particles(
        particles: &[ChargedParticle],
        max_steps: i64,
    ) -> Result<Self, BatchError> {
        let buffers = ParticleBuffers {
            positions: particles.iter().map(|p| p.pos).collect(),
            steps: particles.iter().map(|p| p.num_steps).collect(),
            status: particles.iter().map(|p| p.status).collect(),
            time: particles.iter().map(|p| p.time).collect(),
        };
        let charge = ChargedBuffers {
            momentum: particles.iter().map(|p| p.momentum()).collect(),
            species: particles.iter().map(|p| *p.species()).collect(),
        };
        Self::new(buffers, max_steps)?.with_charge(charge)
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether the batch holds no particles.
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Per-particle step limit.
    pub fn max_steps(&self) -> i64 {
        self.max_steps
    }

    /// Whether momentum and species buffers are attached.
    pub fn is_charged(&self) -> bool {
        self.charge.is_some()
    }

    /// The core buffers.
    pub fn buffers(&self) -> &ParticleBuffers {
        &self.buffers
    }

    /// The charged buffers, if any.
    pub fn charged_buffers(&self) -> Option<&ChargedBuffers> {
        self.charge.as_ref()
    }

    /// Release the buffers to the caller.
    pub fn into_parts(self) -> (ParticleBuffers, Option<ChargedBuffers>) {
        (self.buffers, self.charge)
    }

    /// Bind the batch to `device` for one unit of work.
    pub fn prepare<D: Backend>(&mut self, device: D) -> ParticleView<'_, D> {
        log::debug!(
            "preparing {} view over {} particles (max_steps={}, charged={})",
            device.name(),
            self.len(),
            self.max_steps,
            self.is_charged()
        );
        ParticleView::new(self.slices(), device)
    }

    /// Gather the batch back into tracer records, pairing slot `i` with
    /// `ids[i]`.
    ///
    /// # Errors
    ///
    /// [`BatchError::LengthMismatch`] if `ids` has the wrong length.
    pub fn to_particles(&self, ids: &[ParticleId]) -> Result<Vec<Particle>, BatchError> {
        check_len("ids", self.len(), ids.len())?;
        let b = &self.buffers;
        Ok(ids
            .iter()
            .enumerate()
            .map(|(i, &id)| Particle {
                pos: b.positions[i],
                id,
                num_steps: b.steps[i],
                status: b.status[i],
                time: b.time[i],
            })
            .collect())
    }

    /// Gather a charged batch back into charged records.
    ///
    /// # Errors
    ///
    /// [`BatchError::Uncharged`] for tracer batches,
    /// [`BatchError::LengthMismatch`] if `ids` has the wrong length.
    pub fn to_charged_particles(
        &self,
        ids: &[ParticleId],
    ) -> Result<Vec<ChargedParticle>, BatchError> {
        let charge = self.charge.as_ref().ok_or(BatchError::Uncharged)?;
        check_len("ids", self.len(), ids.len())?;
        let b = &self.buffers;
        Ok(ids
            .iter()
            .enumerate()
            .map(|(i, &id)| {
                let mut p =
                    ChargedParticle::new(b.positions[i], id, charge.species[i], charge.momentum[i]);
                p.num_steps = b.steps[i];
                p.status = b.status[i];
                p.time = b.time[i];
                p
            })
            .collect())
    }

    pub(crate) fn slices(&mut self) -> ParticleSlices<'_> {
        ParticleSlices {
            offset: 0,
            max_steps: self.max_steps,
            pos: &mut self.buffers.positions,
            steps: &mut self.buffers.steps,
            status: &mut self.buffers.status,
            time: &mut self.buffers.time,
            charge: self.charge.as_mut().map(|c| ChargeSlices {
                momentum: &mut c.momentum,
                species: &c.species,
            }),
        }
    }
}

/// A [`ParticleBatch`] plus a fixed-capacity trajectory per particle.
///
/// Row `i` of the trajectory holds `max_steps` slots; slot `k` receives the
/// position after the particle's `(k + 1)`-th step. Unwritten slots keep
/// their initial zero value and stay marked invalid.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordingBatch {
    batch: ParticleBatch,
    width: usize,
    history: Vec<Vec3>,
    valid: Vec<bool>,
}

impl RecordingBatch {
    /// Take ownership of `buffers` and allocate an empty trajectory.
    pub fn new(buffers: ParticleBuffers, max_steps: i64) -> Result<Self, BatchError> {
        Self::from_batch(ParticleBatch::new(buffers, max_steps)?)
    }

    /// Allocate an empty trajectory for an existing batch.
    pub fn from_batch(batch: ParticleBatch) -> Result<Self, BatchError> {
        let (width, slots) = Self::shape(&batch)?;
        Ok(Self {
            batch,
            width,
            history: vec![Vec3::zeros(); slots],
            valid: vec![false; slots],
        })
    }

    /// Claim caller-provided trajectory and validity buffers, each sized
    /// `len × max_steps`. Their contents are kept as-is.
    pub fn claim(
        batch: ParticleBatch,
        history: Vec<Vec3>,
        valid: Vec<bool>,
    ) -> Result<Self, BatchError> {
        let (width, slots) = Self::shape(&batch)?;
        check_len("history", slots, history.len())?;
        check_len("valid", slots, valid.len())?;
        Ok(Self {
            batch,
            width,
            history,
            valid,
        })
    }

    fn shape(batch: &ParticleBatch) -> Result<(usize, usize), BatchError> {
        let too_large = BatchError::HistoryTooLarge {
            particles: batch.len(),
            max_steps: batch.max_steps(),
        };
        let width = usize::try_from(batch.max_steps()).map_err(|_| too_large.clone())?;
        let slots = batch.len().checked_mul(width).ok_or(too_large)?;
        Ok((width, slots))
    }

    /// The underlying particle batch.
    pub fn batch(&self) -> &ParticleBatch {
        &self.batch
    }

    /// Number of particles.
    pub fn len(&self) -> usize {
        self.batch.len()
    }

    /// Whether the batch holds no particles.
    pub fn is_empty(&self) -> bool {
        self.batch.is_empty()
    }

    /// All trajectory slots, row-major by particle.
    pub fn history(&self) -> &[Vec3] {
        &self.history
    }

    /// Validity of every trajectory slot.
    pub fn valid(&self) -> &[bool] {
        &self.valid
    }

    /// Recorded position of particle `idx` after step `step + 1`, or `None`
    /// if the slot is out of range or was never written.
    pub fn get_history(&self, idx: usize, step: usize) -> Option<Vec3> {
        if idx >= self.len() || step >= self.width {
            return None;
        }
        let slot = idx * self.width + step;
        self.valid[slot].then(|| self.history[slot])
    }

    /// Recorded points of particle `idx` in step order, skipping invalid
    /// slots.
    ///
    /// # Panics
    ///
    /// If `idx >= self.len()`.
    pub fn streamline(&self, idx: usize) -> impl Iterator<Item = Vec3> + '_ {
        assert!(idx < self.len(), "particle index {idx} out of range");
        let row = idx * self.width..(idx + 1) * self.width;
        self.history[row.clone()]
            .iter()
            .zip(&self.valid[row])
            .filter_map(|(p, &ok)| ok.then_some(*p))
    }

    /// Release the batch and the trajectory buffers.
    pub fn into_parts(self) -> (ParticleBatch, Vec<Vec3>, Vec<bool>) {
        (self.batch, self.history, self.valid)
    }

    /// Bind the batch to `device` for one unit of work.
    pub fn prepare<D: Backend>(&mut self, device: D) -> RecordingView<'_, D> {
        log::debug!(
            "preparing recording {} view over {} particles ({} slots each)",
            device.name(),
            self.len(),
            self.width
        );
        let slices = RecordingSlices {
            base: self.batch.slices(),
            width: self.width,
            history: &mut self.history,
            valid: &mut self.valid,
        };
        RecordingView::new(slices, device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: usize) -> ParticleBuffers {
        ParticleBuffers::from_positions((0..n).map(|i| Vec3::new(i as f64, 0.0, 0.0)).collect())
    }

    #[test]
    fn rejects_misaligned_buffers() {
        let mut b = line(3);
        b.time.pop();
        assert_eq!(
            ParticleBatch::new(b, 4).unwrap_err(),
            BatchError::LengthMismatch {
                buffer: "time",
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn rejects_negative_counts() {
        assert_eq!(
            ParticleBatch::new(line(1), -1).unwrap_err(),
            BatchError::NegativeMaxSteps { max_steps: -1 }
        );
        let mut b = line(2);
        b.steps[1] = -3;
        assert_eq!(
            ParticleBatch::new(b, 1).unwrap_err(),
            BatchError::NegativeStepCount { index: 1, steps: -3 }
        );
    }

    #[test]
    fn rejects_non_positive_mass() {
        let charge = ChargedBuffers {
            momentum: vec![Vec3::zeros(); 2],
            species: vec![Species::new(1.0, 1.0, 1.0), Species::new(0.0, 1.0, 1.0)],
        };
        let err = ParticleBatch::new(line(2), 3)
            .unwrap()
            .with_charge(charge)
            .unwrap_err();
        assert_eq!(err, BatchError::InvalidMass { index: 1, mass: 0.0 });
    }

    #[test]
    fn tracer_batch_has_no_charged_records() {
        let batch = ParticleBatch::new(line(1), 1).unwrap();
        assert_eq!(
            batch.to_charged_particles(&[ParticleId(0)]).unwrap_err(),
            BatchError::Uncharged
        );
    }

    #[test]
    fn records_survive_scatter_and_gather() {
        let mut p = ChargedParticle::new(
            Vec3::new(1.0, 2.0, 3.0),
            ParticleId(9),
            Species::new(2.0, -1.0, 0.5),
            Vec3::new(0.1, 0.2, 0.3),
        );
        p.num_steps = 4;
        p.time = 0.75;
        p.status.set_took_any_steps();
        let batch = ParticleBatch::from_charged_particles(&[p], 10).unwrap();
        assert_eq!(batch.to_charged_particles(&[ParticleId(9)]).unwrap(), vec![p]);
    }

    #[test]
    fn recording_batch_allocates_empty_rows() {
        let rec = RecordingBatch::new(line(3), 5).unwrap();
        assert_eq!(rec.history().len(), 15);
        assert!(rec.valid().iter().all(|v| !v));
        assert_eq!(rec.get_history(2, 0), None);
        assert_eq!(rec.streamline(1).count(), 0);
    }

    #[test]
    fn claim_checks_trajectory_size() {
        let batch = ParticleBatch::new(line(2), 3).unwrap();
        let err = RecordingBatch::claim(batch, vec![Vec3::zeros(); 5], vec![false; 6]).unwrap_err();
        assert_eq!(
            err,
            BatchError::LengthMismatch {
                buffer: "history",
                expected: 6,
                found: 5
            }
        );
    }
}
