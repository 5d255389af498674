//! Criterion benchmarks for full advection runs on each backend.

use advect_bench::{
    bench_devices, electron_batch, recording_batch, reference_config, tracer_batch, Dipole,
};
use advect_engine::Advector;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

fn bench_tracers_10k(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracers_10k_x100");
    for (name, device) in bench_devices() {
        let adv = Advector::new(reference_config(device, false), Dipole::default()).unwrap();
        group.bench_function(name, |b| {
            b.iter_batched(
                || tracer_batch(42).unwrap(),
                |mut batch| {
                    let metrics = adv.advance(&mut batch).unwrap();
                    black_box((&batch, metrics));
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_recording_10k(c: &mut Criterion) {
    let mut group = c.benchmark_group("recording_10k_x100");
    for (name, device) in bench_devices() {
        let adv = Advector::new(reference_config(device, false), Dipole::default()).unwrap();
        group.bench_function(name, |b| {
            b.iter_batched(
                || recording_batch(42).unwrap(),
                |mut batch| {
                    let metrics = adv.advance_recording(&mut batch).unwrap();
                    black_box((&batch, metrics));
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

fn bench_electrons_10k(c: &mut Criterion) {
    let mut group = c.benchmark_group("electrons_10k_x100");
    for (name, device) in bench_devices() {
        let adv = Advector::new(reference_config(device, true), Dipole::default()).unwrap();
        group.bench_function(name, |b| {
            b.iter_batched(
                || electron_batch(42).unwrap(),
                |mut batch| {
                    let metrics = adv.advance(&mut batch).unwrap();
                    black_box((&batch, metrics));
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_tracers_10k,
    bench_recording_10k,
    bench_electrons_10k
);
criterion_main!(benches);
