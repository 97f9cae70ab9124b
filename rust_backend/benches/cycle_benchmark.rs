use chrono::{Duration, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use qtty::{Degrees, Kilometers};

use ntn_handover::models::{Constellation, CycleInput, PositionSample, SatelliteTrack};
use ntn_handover::signal::SignalQualityCalculator;
use ntn_handover::{HandoverConfig, HandoverPipeline};

fn synthetic_track(index: usize, samples: usize) -> SatelliteTrack {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let constellation = if index % 2 == 0 {
        Constellation::Starlink
    } else {
        Constellation::OneWeb
    };
    let positions = (0..samples)
        .map(|i| {
            let phase = (index * 17 + i) as f64 * 0.05;
            PositionSample::new(
                start + Duration::seconds(i as i64),
                Degrees::new(10.0 + 70.0 * phase.sin().abs()),
                Kilometers::new(550.0 + 1500.0 * phase.cos().abs()),
            )
        })
        .collect();
    SatelliteTrack::new(format!("SAT-{}", index), constellation, positions)
}

fn synthetic_cycle(satellites: usize, samples: usize) -> CycleInput {
    CycleInput {
        timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        serving_satellite_id: "SAT-0".to_string(),
        satellites: (0..satellites).map(|i| synthetic_track(i, samples)).collect(),
    }
}

fn bench_signal_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("signal_profile");
    let calculator = SignalQualityCalculator::new();

    for samples in [60, 600] {
        let track = synthetic_track(1, samples);
        group.bench_with_input(BenchmarkId::new("compute", samples), &track, |b, track| {
            b.iter(|| {
                calculator.compute(
                    black_box(&track.satellite_id),
                    track.constellation,
                    black_box(&track.positions),
                )
            });
        });
    }

    group.finish();
}

fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("handover_cycle");
    let config = HandoverConfig::default();

    for satellites in [5, 20, 80] {
        let input = synthetic_cycle(satellites, 120);
        group.bench_with_input(
            BenchmarkId::new("run_cycle", satellites),
            &input,
            |b, input| {
                b.iter_batched(
                    || HandoverPipeline::new(&config).unwrap(),
                    |mut pipeline| pipeline.run_cycle(black_box(input)),
                    criterion::BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_signal_profile, bench_cycle);
criterion_main!(benches);
