//! Advect quickstart: streamlines through a vortex.
//!
//! Demonstrates:
//!   1. Implementing a field sampler (solid-body rotation about z)
//!   2. Building an AdvectConfig with bounds and a backend
//!   3. Advancing a RecordingBatch and reading back its streamlines
//!   4. Inspecting run metrics and final particle status
//!
//! Run with:
//!   cargo run --example quickstart

use advect_batch::ParticleBuffers;
use advect_batch::RecordingBatch;
use advect_core::{FieldSample, FieldSampler, Scalar, Vec3};
use advect_engine::{AdvectConfig, Advector, Bounds, DeviceKind};
use smallvec::smallvec;

// ─── Parameters ─────────────────────────────────────────────────

const SEEDS: usize = 6;
const STEP: f64 = 0.05;
const MAX_STEPS: i64 = 200;
const OMEGA: f64 = 1.0;
const DRIFT: f64 = 0.4;

// ─── Sampler: vortex with an outward drift ──────────────────────
//
// v = ω ẑ × r + drift · r̂, so seeds spiral outward until they leave
// the box.

struct Vortex;

impl FieldSampler for Vortex {
    fn sample(&self, p: &Vec3, _step_length: Scalar) -> FieldSample {
        let r = p.xy().norm().max(1e-12);
        smallvec![Vec3::new(
            -OMEGA * p.y + DRIFT * p.x / r,
            OMEGA * p.x + DRIFT * p.y / r,
            0.0,
        )]
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AdvectConfig {
        step_length: STEP,
        max_steps: MAX_STEPS,
        bounds: Some(Bounds::new(Vec3::new(-4.0, -4.0, -1.0), Vec3::new(4.0, 4.0, 1.0))),
        device: DeviceKind::MultiCore { grain: 2 },
        ..Default::default()
    };
    let advector = Advector::new(config, Vortex)?;

    let seeds: Vec<Vec3> = (0..SEEDS)
        .map(|i| Vec3::new(0.25 + 0.25 * i as f64, 0.0, 0.0))
        .collect();
    let mut batch = RecordingBatch::new(ParticleBuffers::from_positions(seeds), MAX_STEPS)?;

    let metrics = advector.advance_recording(&mut batch)?;
    println!(
        "{} rounds, {} steps, {} out of bounds, {} at step limit",
        metrics.rounds, metrics.steps_taken, metrics.exited_spatial, metrics.terminated
    );

    let buffers = batch.batch().buffers();
    for i in 0..batch.len() {
        let line: Vec<Vec3> = batch.streamline(i).collect();
        let end = buffers.positions[i];
        println!(
            "seed {i}: {} points, ends at ({:.3}, {:.3}) after t={:.2} [{:?}]",
            line.len(),
            end.x,
            end.y,
            buffers.time[i],
            buffers.status[i]
        );
        for p in line.iter().step_by(25) {
            println!("    ({:+.3}, {:+.3})", p.x, p.y);
        }
    }
    Ok(())
}
