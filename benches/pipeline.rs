use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use kuba_sampling::pipeline::{aggregate, clip, moving_average};
use kuba_sampling::{DataPoint, DataSample, DataSampleProperties, SampleContext, TemporalAmount};

fn newest() -> DateTime<FixedOffset> {
    Utc.with_ymd_and_hms(2021, 6, 15, 0, 0, 0)
        .unwrap()
        .fixed_offset()
}

/// One point per minute, newest first
fn create_minute_points(count: usize) -> Vec<DataPoint> {
    (0..count)
        .map(|i| {
            DataPoint::new(
                newest() - TimeDelta::minutes(i as i64),
                1,
                100.0 + (i as f64 * 0.5),
            )
        })
        .collect()
}

fn bench_moving_average(c: &mut Criterion) {
    let ctx = SampleContext::default().with_now(newest().with_timezone(&Utc));
    let mut group = c.benchmark_group("moving_average");

    for size in [100, 1000, 10000].iter() {
        let points = create_minute_points(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let sample = DataSample::from_points(points.clone(), DataSampleProperties::default());
                black_box(
                    moving_average(sample, TimeDelta::hours(1), &ctx)
                        .collect_points()
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let ctx = SampleContext::default().with_now(newest().with_timezone(&Utc));
    let mut group = c.benchmark_group("aggregate_hourly");

    for size in [100, 1000, 10000].iter() {
        let points = create_minute_points(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let sample = DataSample::from_points(points.clone(), DataSampleProperties::default());
                let clipped = clip(sample, None, Some(TimeDelta::days(3)), &ctx);
                black_box(
                    aggregate(clipped, 1, None, None, &TemporalAmount::hours(1), &ctx)
                        .unwrap()
                        .collect_points()
                        .unwrap(),
                )
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_moving_average, bench_aggregate);
criterion_main!(benches);
