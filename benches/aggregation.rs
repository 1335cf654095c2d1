use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hexdemand::aggregation::{run_aggregation, AggregationParams};
use hexdemand::core::{DemandEvent, SupplyRecord};
use hexdemand::indexing::H3Indexer;

const T0: u64 = 1_704_103_200_000;

/// Points spread over roughly 20 km around lower Manhattan, one per second.
fn synthetic_data(n: u64) -> (Vec<DemandEvent>, Vec<SupplyRecord>) {
    let demand = (0..n)
        .map(|i| {
            let lat = 40.60 + (i % 997) as f64 * 0.0002;
            let lng = -74.10 + (i % 991) as f64 * 0.0002;
            DemandEvent::new(T0 + i * 1000, lat, lng)
        })
        .collect();

    let supply = (0..n / 10)
        .map(|i| {
            let lat = 40.60 + (i % 89) as f64 * 0.002;
            let lng = -74.10 + (i % 83) as f64 * 0.002;
            SupplyRecord::new(T0, T0 + n * 1000, lat, lng)
        })
        .collect();

    (demand, supply)
}

fn bench_full_pass(c: &mut Criterion) {
    let indexer = H3Indexer::new();
    let mut group = c.benchmark_group("run_aggregation");

    for n in [1_000u64, 10_000, 50_000] {
        let (demand, supply) = synthetic_data(n);
        let params = AggregationParams {
            snapshot_time: T0 + n * 1000,
            window_minutes: 1440,
            resolution: 8,
        };
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| run_aggregation(&indexer, black_box(&demand), black_box(&supply), &params));
        });
    }
    group.finish();
}

fn bench_resolutions(c: &mut Criterion) {
    let indexer = H3Indexer::new();
    let (demand, supply) = synthetic_data(10_000);
    let mut group = c.benchmark_group("resolution");

    for resolution in [5u8, 8, 10, 12] {
        let params = AggregationParams {
            snapshot_time: T0 + 10_000 * 1000,
            window_minutes: 60 * 24,
            resolution,
        };
        group.bench_with_input(BenchmarkId::from_parameter(resolution), &resolution, |b, _| {
            b.iter(|| run_aggregation(&indexer, &demand, &supply, black_box(&params)));
        });
    }
    group.finish();
}

fn bench_narrow_window(c: &mut Criterion) {
    let indexer = H3Indexer::new();
    let (demand, supply) = synthetic_data(50_000);
    let params = AggregationParams {
        snapshot_time: T0 + 25_000 * 1000,
        window_minutes: 15,
        resolution: 8,
    };

    c.bench_function("narrow_window_50k", |b| {
        b.iter(|| run_aggregation(&indexer, black_box(&demand), black_box(&supply), &params));
    });
}

criterion_group!(benches, bench_full_pass, bench_resolutions, bench_narrow_window);
criterion_main!(benches);
