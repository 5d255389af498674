//! Execution views: a batch's buffers bound to a backend for one unit of
//! work.
//!
//! Index-based operations live on [`ExecutionView`] and act on one particle
//! from the calling thread. Bulk work goes through `for_each` /
//! `try_for_each`, which hand every lane to the bound backend.

use std::sync::{Mutex, PoisonError};

use advect_core::{ParticleStatus, Scalar, Vec3};

use crate::backend::{Backend, Partition};
use crate::lane::{Lane, ParticleLane, ParticleSlices, RecordingLane, RecordingSlices};

/// Index-based access to the particles of a bound batch.
///
/// # Panics
///
/// Every per-index method panics if `idx >= self.len()`.
pub trait ExecutionView {
    /// Lane type handed out by [`lane`](Self::lane).
    type Lane<'l>: Lane
    where
        Self: 'l;

    /// Number of particles.
    fn len(&self) -> usize;

    /// Whether the view holds no particles.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Per-particle step limit.
    fn max_steps(&self) -> i64;

    /// Mutable handle on particle `idx`.
    fn lane(&mut self, idx: usize) -> Self::Lane<'_>;

    /// Position of particle `idx`.
    fn get_pos(&self, idx: usize) -> Vec3;
    /// Step count of particle `idx`.
    fn get_step(&self, idx: usize) -> i64;
    /// Status of particle `idx`.
    fn get_status(&self, idx: usize) -> ParticleStatus;
    /// Elapsed time of particle `idx`.
    fn get_time(&self, idx: usize) -> Scalar;

    /// See [`Lane::take_step`].
    fn take_step(&mut self, idx: usize, pt: Vec3) {
        self.lane(idx).take_step(pt);
    }
    /// See [`Lane::set_time`].
    fn set_time(&mut self, idx: usize, time: Scalar) {
        self.lane(idx).set_time(time);
    }
    /// See [`Lane::set_ok`].
    fn set_ok(&mut self, idx: usize) {
        self.lane(idx).set_ok();
    }
    /// See [`Lane::set_terminated`].
    fn set_terminated(&mut self, idx: usize) {
        self.lane(idx).set_terminated();
    }
    /// See [`Lane::set_exit_spatial_boundary`].
    fn set_exit_spatial_boundary(&mut self, idx: usize) {
        self.lane(idx).set_exit_spatial_boundary();
    }
    /// See [`Lane::set_exit_temporal_boundary`].
    fn set_exit_temporal_boundary(&mut self, idx: usize) {
        self.lane(idx).set_exit_temporal_boundary();
    }
    /// See [`Lane::set_error`].
    fn set_error(&mut self, idx: usize) {
        self.lane(idx).set_error();
    }
    /// See [`Lane::set_took_any_steps`].
    fn set_took_any_steps(&mut self, idx: usize, value: bool) {
        self.lane(idx).set_took_any_steps(value);
    }

    /// `OK` is set on particle `idx`.
    fn ok(&self, idx: usize) -> bool {
        self.get_status(idx).check_ok()
    }
    /// `TERMINATED` is set on particle `idx`.
    fn terminated(&self, idx: usize) -> bool {
        self.get_status(idx).check_terminate()
    }
    /// `SPATIAL_BOUNDS` is set on particle `idx`.
    fn exit_spatial_boundary(&self, idx: usize) -> bool {
        self.get_status(idx).check_spatial_bounds()
    }
    /// `TEMPORAL_BOUNDS` is set on particle `idx`.
    fn exit_temporal_boundary(&self, idx: usize) -> bool {
        self.get_status(idx).check_temporal_bounds()
    }
    /// `ERROR` is set on particle `idx`.
    fn error(&self, idx: usize) -> bool {
        self.get_status(idx).check_error()
    }
    /// Particle `idx` can take another step.
    fn integrateable(&self, idx: usize) -> bool {
        self.get_status(idx).is_integrateable()
    }
    /// Particle `idx` cannot take another step.
    fn done(&self, idx: usize) -> bool {
        self.get_status(idx).is_done()
    }

    /// Every particle is done.
    fn all_done(&self) -> bool {
        (0..self.len()).all(|idx| self.done(idx))
    }
}

/// Keeps the failure with the lowest particle index, so every backend
/// reports the same error for the same batch.
struct FirstFailure<E>(Mutex<Option<(usize, E)>>);

impl<E> FirstFailure<E> {
    fn new() -> Self {
        Self(Mutex::new(None))
    }

    fn record(&self, index: usize, err: E) {
        let mut slot = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        match &*slot {
            Some((seen, _)) if *seen <= index => {}
            _ => *slot = Some((index, err)),
        }
    }

    fn into_result(self) -> Result<(), E> {
        match self.0.into_inner().unwrap_or_else(PoisonError::into_inner) {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }
}

/// A [`ParticleBatch`](crate::ParticleBatch) bound to backend `D`.
pub struct ParticleView<'a, D> {
    slices: ParticleSlices<'a>,
    device: D,
}

impl<'a, D: Backend> ParticleView<'a, D> {
    pub(crate) fn new(slices: ParticleSlices<'a>, device: D) -> Self {
        Self { slices, device }
    }

    /// The bound backend.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Run `kernel` once per particle on the bound backend.
    pub fn for_each<F>(&mut self, kernel: F)
    where
        F: Fn(&mut ParticleLane<'_>) + Sync,
    {
        log::trace!("{} dispatch over {} lanes", self.device.name(), self.slices.len());
        self.device
            .dispatch(self.slices.reborrow(), |part, lane| kernel(&mut part.lane(lane)));
    }

    /// Run `kernel` once per particle; a failing lane does not stop the
    /// others. Returns the failure of the lowest-indexed failing particle.
    pub fn try_for_each<E, F>(&mut self, kernel: F) -> Result<(), E>
    where
        E: Send,
        F: Fn(&mut ParticleLane<'_>) -> Result<(), E> + Sync,
    {
        let failure = FirstFailure::new();
        self.for_each(|lane| {
            if let Err(err) = kernel(&mut *lane) {
                failure.record(lane.index(), err);
            }
        });
        failure.into_result()
    }
}

impl<D: Backend> ExecutionView for ParticleView<'_, D> {
    type Lane<'l>
        = ParticleLane<'l>
    where
        Self: 'l;

    fn len(&self) -> usize {
        self.slices.len()
    }

    fn max_steps(&self) -> i64 {
        self.slices.max_steps
    }

    fn lane(&mut self, idx: usize) -> ParticleLane<'_> {
        self.slices.lane(idx)
    }

    fn get_pos(&self, idx: usize) -> Vec3 {
        self.slices.pos[idx]
    }

    fn get_step(&self, idx: usize) -> i64 {
        self.slices.steps[idx]
    }

    fn get_status(&self, idx: usize) -> ParticleStatus {
        self.slices.status[idx]
    }

    fn get_time(&self, idx: usize) -> Scalar {
        self.slices.time[idx]
    }
}

/// A [`RecordingBatch`](crate::RecordingBatch) bound to backend `D`.
pub struct RecordingView<'a, D> {
    slices: RecordingSlices<'a>,
    device: D,
}

impl<'a, D: Backend> RecordingView<'a, D> {
    pub(crate) fn new(slices: RecordingSlices<'a>, device: D) -> Self {
        Self { slices, device }
    }

    /// The bound backend.
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Recorded position of particle `idx` at slot `step`, i.e. after its
    /// `(step + 1)`-th step.
    ///
    /// Returns the slot's raw content; check [`is_valid`](Self::is_valid)
    /// before trusting it.
    ///
    /// # Panics
    ///
    /// If `idx` or `step` is out of range.
    pub fn get_history(&self, idx: usize, step: usize) -> Vec3 {
        self.slices.history[self.slot(idx, step)]
    }

    /// Whether slot `step` of particle `idx` has been written.
    ///
    /// # Panics
    ///
    /// If `idx` or `step` is out of range.
    pub fn is_valid(&self, idx: usize, step: usize) -> bool {
        self.slices.valid[self.slot(idx, step)]
    }

    fn slot(&self, idx: usize, step: usize) -> usize {
        assert!(
            idx < self.len() && step < self.slices.width,
            "history slot ({idx}, {step}) out of range"
        );
        idx * self.slices.width + step
    }

    /// Run `kernel` once per particle on the bound backend.
    pub fn for_each<F>(&mut self, kernel: F)
    where
        F: Fn(&mut RecordingLane<'_>) + Sync,
    {
        log::trace!(
            "{} recording dispatch over {} lanes",
            self.device.name(),
            self.slices.len()
        );
        self.device
            .dispatch(self.slices.reborrow(), |part, lane| kernel(&mut part.lane(lane)));
    }

    /// Fallible variant of [`for_each`](Self::for_each); see
    /// [`ParticleView::try_for_each`].
    pub fn try_for_each<E, F>(&mut self, kernel: F) -> Result<(), E>
    where
        E: Send,
        F: Fn(&mut RecordingLane<'_>) -> Result<(), E> + Sync,
    {
        let failure = FirstFailure::new();
        self.for_each(|lane| {
            if let Err(err) = kernel(&mut *lane) {
                failure.record(lane.index(), err);
            }
        });
        failure.into_result()
    }
}

impl<D: Backend> ExecutionView for RecordingView<'_, D> {
    type Lane<'l>
        = RecordingLane<'l>
    where
        Self: 'l;

    fn len(&self) -> usize {
        self.slices.len()
    }

    fn max_steps(&self) -> i64 {
        self.slices.base.max_steps
    }

    fn lane(&mut self, idx: usize) -> RecordingLane<'_> {
        self.slices.lane(idx)
    }

    fn get_pos(&self, idx: usize) -> Vec3 {
        self.slices.base.pos[idx]
    }

    fn get_step(&self, idx: usize) -> i64 {
        self.slices.base.steps[idx]
    }

    fn get_status(&self, idx: usize) -> ParticleStatus {
        self.slices.base.status[idx]
    }

    fn get_time(&self, idx: usize) -> Scalar {
        self.slices.base.time[idx]
    }
}
