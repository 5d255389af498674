//! Criterion micro-benchmarks for the per-particle kernels.

use advect_bench::{reference_electrons, Dipole};
use advect_core::{boris_push, gamma, Advectable, FieldSampler, Vec3};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Benchmark: one Boris push in fixed fields.
fn bench_boris_push(c: &mut Criterion) {
    let e = Vec3::new(1.0e3, 0.0, -2.0e2);
    let b = Vec3::new(0.0, 1.0e-2, 5.0e-3);
    let mut momentum = Vec3::new(1.0e-22, 3.0e-23, 0.0);

    c.bench_function("boris_push", |bench| {
        bench.iter(|| {
            let v = boris_push(
                &mut momentum,
                black_box(9.109_383_7e-31),
                black_box(-1.602_176_634e-19),
                &e,
                &b,
                black_box(1.0e-12),
            );
            black_box(v);
        });
    });
}

/// Benchmark: Lorentz factor and its reciprocal.
fn bench_gamma(c: &mut Criterion) {
    let p = Vec3::new(1.0e-22, -4.0e-23, 7.0e-23);
    c.bench_function("gamma_pair", |bench| {
        bench.iter(|| {
            let g = gamma(black_box(&p), 9.109_383_7e-31, false);
            let r = gamma(black_box(&p), 9.109_383_7e-31, true);
            black_box((g, r));
        });
    });
}

/// Benchmark: sample + velocity for 10K electrons, record-at-a-time.
fn bench_record_velocity_10k(c: &mut Criterion) {
    let field = Dipole::default();
    let electrons = reference_electrons(42);

    c.bench_function("record_velocity_10k", |bench| {
        bench.iter_batched_ref(
            || electrons.clone(),
            |ps| {
                for p in ps.iter_mut() {
                    let eval = p.evaluation_position(1.0e-12);
                    let sample = field.sample(&eval, 1.0e-12);
                    black_box(p.velocity(&sample, 1.0e-12).unwrap());
                }
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    bench_boris_push,
    bench_gamma,
    bench_record_velocity_10k
);
criterion_main!(benches);
