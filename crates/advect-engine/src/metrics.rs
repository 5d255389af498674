//! Per-run metrics for the advector.
//!
//! [`RunMetrics`] summarizes one `advance` call: how long it ran, how many
//! steps it integrated, and where every particle ended up.

use advect_core::ParticleStatus;

/// Counters collected during a single run.
///
/// Status counts are taken from the final status buffer; a particle may be
/// counted under more than one exit reason (for instance terminated on the
/// same step it left the domain).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunMetrics {
    /// Dispatch rounds executed.
    pub rounds: u64,
    /// Steps integrated across all particles during this run.
    pub steps_taken: u64,
    /// Particles carrying `TERMINATED`.
    pub terminated: usize,
    /// Particles carrying `SPATIAL_BOUNDS`.
    pub exited_spatial: usize,
    /// Particles carrying `TEMPORAL_BOUNDS`.
    pub exited_temporal: usize,
    /// Particles carrying `ERROR`.
    pub errored: usize,
    /// Particles still integrateable when the run stopped.
    pub still_active: usize,
    /// Wall-clock time for the run, in microseconds.
    pub elapsed_us: u64,
}

impl RunMetrics {
    /// Tally the exit reasons in `status`.
    pub(crate) fn tally(&mut self, status: &[ParticleStatus]) {
        for s in status {
            self.terminated += usize::from(s.check_terminate());
            self.exited_spatial += usize::from(s.check_spatial_bounds());
            self.exited_temporal += usize::from(s.check_temporal_bounds());
            self.errored += usize::from(s.check_error());
            self.still_active += usize::from(s.is_integrateable());
        }
    }

    /// Whether the run stopped with particles still able to step.
    pub fn hit_round_limit(&self) -> bool {
        self.still_active > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_metrics_are_zero() {
        let m = RunMetrics::default();
        assert_eq!(m.rounds, 0);
        assert_eq!(m.steps_taken, 0);
        assert_eq!(m.still_active, 0);
        assert_eq!(m.elapsed_us, 0);
        assert!(!m.hit_round_limit());
    }

    #[test]
    fn tally_counts_each_flag() {
        let mut term = ParticleStatus::ok();
        term.mark_terminated();
        let mut both = ParticleStatus::ok();
        both.mark_terminated();
        both.mark_exit_spatial_boundary();
        let mut err = ParticleStatus::ok();
        err.mark_error();
        let mut m = RunMetrics::default();
        m.tally(&[ParticleStatus::ok(), term, both, err]);
        assert_eq!(m.terminated, 2);
        assert_eq!(m.exited_spatial, 1);
        assert_eq!(m.exited_temporal, 0);
        assert_eq!(m.errored, 1);
        assert_eq!(m.still_active, 1);
    }
}
