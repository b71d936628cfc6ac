//! Engine benchmarks (criterion - wall-clock time).
//!
//! Run all:    cargo bench --manifest-path benchmarks/Cargo.toml --bench engine
//! Filter:     cargo bench --manifest-path benchmarks/Cargo.toml --bench engine -- mapping

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;
use tacton::{resolve_collisions, CollisionResolution, CurveSample, HapticDevice, SurfaceHit};
use tacton_bench::*;

// ---------------------------------------------------------------------------
// Coordinate mapping
// ---------------------------------------------------------------------------

fn bench_mapping(c: &mut Criterion) {
    let segment = setup_segment();

    c.bench_function("mapping/to_surface_hit", |b| {
        let point = Vec3::new(0.23, 1.2, -0.38);
        b.iter(|| segment.to_surface_hit(point));
    });

    c.bench_function("mapping/to_world_point", |b| {
        let hit = SurfaceHit::new(0.4, 135.0);
        b.iter(|| segment.to_world_point(hit, false));
    });

    c.bench_function("mapping/to_world_point_on_surface", |b| {
        // In the cap region, where the ray-sphere correction runs.
        let hit = SurfaceHit::new(0.05, 135.0);
        b.iter(|| segment.to_world_point(hit, true));
    });

    c.bench_function("mapping/round_trip", |b| {
        let hit = SurfaceHit::new(0.6, 250.0);
        b.iter(|| segment.to_surface_hit(segment.to_world_point(hit, false)));
    });
}

// ---------------------------------------------------------------------------
// Curve and pattern evaluation
// ---------------------------------------------------------------------------

fn bench_evaluation(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("curve/evaluate");
        for &keys in &[4, 16, 64, 256] {
            let curve = setup_curve(keys);
            group.bench_with_input(BenchmarkId::from_parameter(keys), &keys, |b, _| {
                b.iter(|| curve.evaluate(1.0));
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("pattern/evaluate_all");
        for &curves in &[1, 4, 16] {
            let pattern = setup_pattern(curves, 16);
            group.bench_with_input(BenchmarkId::from_parameter(curves), &curves, |b, _| {
                b.iter(|| pattern.evaluate_all(1.0));
            });
        }
        group.finish();
    }
}

// ---------------------------------------------------------------------------
// Collision resolution and playback stepping
// ---------------------------------------------------------------------------

fn bench_playback(c: &mut Criterion) {
    {
        let mut group = c.benchmark_group("device/resolve_collisions");
        for &curves in &[2, 8, 32] {
            let areas = setup_areas(4, 8);
            let samples: Vec<Option<CurveSample>> = (0..curves)
                .map(|i| {
                    Some(CurveSample {
                        hit: SurfaceHit::new(0.5, (i * 7) as f32 % 360.0),
                        intensity: 0.5,
                    })
                })
                .collect();
            group.bench_with_input(BenchmarkId::from_parameter(curves), &curves, |b, _| {
                b.iter(|| resolve_collisions(&areas, &samples, CollisionResolution::Average, 0));
            });
        }
        group.finish();
    }

    {
        let mut group = c.benchmark_group("device/step");
        for &curves in &[1, 4, 16] {
            group.bench_with_input(BenchmarkId::from_parameter(curves), &curves, |b, _| {
                let mut device = setup_playing_device(curves, 16);
                let pattern = setup_pattern(curves, 16);
                let segment = tacton::SegmentId::new("forearm");
                b.iter(|| {
                    device.step(1.0 / 600.0);
                    if !device.is_playing() {
                        device.start_pattern(&segment, pattern.clone());
                    }
                });
            });
        }
        group.finish();
    }
}

criterion_group!(benches, bench_mapping, bench_evaluation, bench_playback);
criterion_main!(benches);
