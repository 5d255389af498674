//! The reference stepper.
//!
//! [`Advector`] drives a batch in rounds. Each round hands every lane to the
//! configured backend once; an integrateable lane takes exactly one step:
//!
//! ```text
//! eval   = lane.evaluation_position(h)
//! sample = sampler.sample(eval, h)
//! v      = lane.velocity(sample, h)?      // charged lanes commit momentum here
//! lane.take_step(pos + v·h)               // may set TERMINATED at max_steps
//! lane.time += h; TOOK_ANY_STEPS = 1
//! bounds policy                           // SPATIAL_BOUNDS / TEMPORAL_BOUNDS
//! ```
//!
//! The run stops when every particle is done, when `max_rounds` is reached,
//! or after a round in which the sampler returned a malformed sample.

use std::time::Instant;

use advect_batch::{
    ExecutionView, Lane, ParticleBatch, ParticleBuffers, RecordingBatch,
};
use advect_core::{ChargedParticle, CoreError, FieldSampler, Particle, ParticleId};

use crate::config::AdvectConfig;
use crate::error::AdvectError;
use crate::metrics::RunMetrics;

/// Steps particle batches through a sampled field.
pub struct Advector<S> {
    config: AdvectConfig,
    sampler: S,
}

impl<S: FieldSampler> Advector<S> {
    /// Create an advector, validating `config` first.
    pub fn new(config: AdvectConfig, sampler: S) -> Result<Self, AdvectError> {
        config.validate()?;
        Ok(Self { config, sampler })
    }

    /// The validated configuration.
    pub fn config(&self) -> &AdvectConfig {
        &self.config
    }

    /// The field sampler.
    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    /// Advance every particle of `batch` until all are done or the round
    /// limit is reached.
    ///
    /// # Errors
    ///
    /// [`AdvectError::Sample`] if the sampler returns a sample of the wrong
    /// arity for some particle. Lanes processed in that round keep their
    /// updates; the failing particle is marked `ERROR`.
    pub fn advance(&self, batch: &mut ParticleBatch) -> Result<RunMetrics, AdvectError> {
        let started = Instant::now();
        let steps_before = total_steps(&batch.buffers().steps);
        log::info!(
            "advancing {} particles (h={}, max_steps={}, device={:?})",
            batch.len(),
            self.config.step_length,
            batch.max_steps(),
            self.config.device
        );

        let mut view = batch.prepare(self.config.device.device());
        let rounds = self.drive(&mut view, |v| {
            v.try_for_each(|lane| self.step_lane(lane))
                .map_err(sample_error)
        })?;
        drop(view);

        let metrics = self.finish(started, rounds, steps_before, batch.buffers());
        Ok(metrics)
    }

    /// [`advance`](Self::advance) for a recording batch: every step is also
    /// written to the particle's trajectory row.
    pub fn advance_recording(&self, batch: &mut RecordingBatch) -> Result<RunMetrics, AdvectError> {
        let started = Instant::now();
        let steps_before = total_steps(&batch.batch().buffers().steps);
        log::info!(
            "advancing {} particles with history (h={}, max_steps={}, device={:?})",
            batch.len(),
            self.config.step_length,
            batch.batch().max_steps(),
            self.config.device
        );

        let mut view = batch.prepare(self.config.device.device());
        let rounds = self.drive(&mut view, |v| {
            v.try_for_each(|lane| self.step_lane(lane))
                .map_err(sample_error)
        })?;
        drop(view);

        let metrics = self.finish(started, rounds, steps_before, batch.batch().buffers());
        Ok(metrics)
    }

    /// Advance tracer records in place, using the configured step limit.
    pub fn advance_particles(&self, particles: &mut [Particle]) -> Result<RunMetrics, AdvectError> {
        let ids: Vec<ParticleId> = particles.iter().map(|p| p.id).collect();
        let mut batch = ParticleBatch::from_particles(particles, self.config.max_steps)?;
        let metrics = self.advance(&mut batch)?;
        for (dst, src) in particles.iter_mut().zip(batch.to_particles(&ids)?) {
            *dst = src;
        }
        Ok(metrics)
    }

    /// Advance charged records in place, using the configured step limit.
    pub fn advance_charged_particles(
        &self,
        particles: &mut [ChargedParticle],
    ) -> Result<RunMetrics, AdvectError> {
        let ids: Vec<ParticleId> = particles.iter().map(|p| p.id).collect();
        let mut batch = ParticleBatch::from_charged_particles(particles, self.config.max_steps)?;
        let metrics = self.advance(&mut batch)?;
        for (dst, src) in particles.iter_mut().zip(batch.to_charged_particles(&ids)?) {
            *dst = src;
        }
        Ok(metrics)
    }

    /// Build a recording batch from tracer records with the configured step
    /// limit.
    pub fn recording_batch(&self, particles: &[Particle]) -> Result<RecordingBatch, AdvectError> {
        let batch = ParticleBatch::from_particles(particles, self.config.max_steps)?;
        Ok(RecordingBatch::from_batch(batch)?)
    }

    /// Run rounds until the view is done or the round limit is reached.
    fn drive<V, F>(&self, view: &mut V, mut round: F) -> Result<u64, AdvectError>
    where
        V: ExecutionView,
        F: FnMut(&mut V) -> Result<(), AdvectError>,
    {
        let mut rounds = 0;
        while rounds < self.config.max_rounds && !view.all_done() {
            round(&mut *view)?;
            rounds += 1;
            log::debug!("round {rounds} complete");
        }
        Ok(rounds)
    }

    /// One integration step for one lane. Returns `Err` only for a
    /// malformed sample, after marking the lane errored.
    fn step_lane<L: Lane>(&self, lane: &mut L) -> Result<(), (usize, CoreError)> {
        if !lane.integrateable() {
            return Ok(());
        }
        let h = self.config.step_length;
        let eval = lane.evaluation_position(h);
        let sample = self.sampler.sample(&eval, h);
        let v = match lane.velocity(&sample, h) {
            Ok(v) => v,
            Err(e) => {
                lane.set_error();
                return Err((lane.index(), e));
            }
        };
        lane.take_step(lane.pos() + v * h);
        lane.set_time(lane.time() + h);
        lane.set_took_any_steps(true);

        if let Some(bounds) = &self.config.bounds {
            if !bounds.contains(&lane.pos()) {
                lane.set_exit_spatial_boundary();
            }
        }
        if let Some(max_time) = self.config.max_time {
            if lane.time() >= max_time {
                lane.set_exit_temporal_boundary();
            }
        }
        Ok(())
    }

    fn finish(
        &self,
        started: Instant,
        rounds: u64,
        steps_before: u64,
        buffers: &ParticleBuffers,
    ) -> RunMetrics {
        let mut metrics = RunMetrics {
            rounds,
            steps_taken: total_steps(&buffers.steps).saturating_sub(steps_before),
            elapsed_us: started.elapsed().as_micros() as u64,
            ..Default::default()
        };
        metrics.tally(&buffers.status);
        if metrics.hit_round_limit() {
            log::warn!(
                "stopped after {rounds} rounds with {} particles still active",
                metrics.still_active
            );
        }
        log::info!(
            "advanced {} steps in {rounds} rounds ({} us): {} terminated, {} out of bounds, {} out of time",
            metrics.steps_taken,
            metrics.elapsed_us,
            metrics.terminated,
            metrics.exited_spatial,
            metrics.exited_temporal
        );
        metrics
    }
}

fn total_steps(steps: &[i64]) -> u64 {
    steps
        .iter()
        .fold(0u64, |acc, &s| acc.saturating_add(s.max(0) as u64))
}

fn sample_error((index, source): (usize, CoreError)) -> AdvectError {
    AdvectError::Sample { index, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advect_core::{FieldSample, Scalar, Vec3};
    use smallvec::smallvec;

    fn constant(v: Vec3) -> impl Fn(&Vec3, Scalar) -> FieldSample + Sync {
        move |_: &Vec3, _: Scalar| -> FieldSample { smallvec![v] }
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let cfg = AdvectConfig {
            step_length: -1.0,
            ..Default::default()
        };
        assert!(matches!(
            Advector::new(cfg, constant(Vec3::zeros())),
            Err(AdvectError::Config(_))
        ));
    }

    #[test]
    fn steps_until_max_steps() {
        let cfg = AdvectConfig {
            step_length: 0.5,
            max_steps: 4,
            ..Default::default()
        };
        let adv = Advector::new(cfg, constant(Vec3::new(1.0, 0.0, 0.0))).unwrap();
        let mut ps = vec![Particle::new(Vec3::zeros(), ParticleId(3))];
        let m = adv.advance_particles(&mut ps).unwrap();
        assert_eq!(m.rounds, 4);
        assert_eq!(m.steps_taken, 4);
        assert_eq!(m.terminated, 1);
        assert_eq!(ps[0].id, ParticleId(3));
        assert_eq!(ps[0].num_steps, 4);
        assert_eq!(ps[0].pos, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(ps[0].time, 2.0);
        assert!(ps[0].status.check_took_any_steps());
        assert!(!ps[0].status.check_ok());
    }

    #[test]
    fn step_totals_saturate() {
        assert_eq!(total_steps(&[3, -1, 4]), 7);
        assert_eq!(total_steps(&[i64::MAX, i64::MAX, i64::MAX]), u64::MAX);
    }

    #[test]
    fn done_particles_are_not_stepped() {
        let adv = Advector::new(AdvectConfig::default(), constant(Vec3::repeat(1.0))).unwrap();
        let mut p = Particle::new(Vec3::zeros(), ParticleId(0));
        p.status.mark_exit_temporal_boundary();
        let mut ps = vec![p];
        let m = adv.advance_particles(&mut ps).unwrap();
        assert_eq!(m.rounds, 0);
        assert_eq!(ps[0], p);
    }
}
