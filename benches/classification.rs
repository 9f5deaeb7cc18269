use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use plumb_tilt::analysis::{aggregate, reject_outliers, LineClassifier, TiltEstimator};
use plumb_tilt::pipeline::{LineSegment, TiltEstimate};

/// Deterministic spread of segments: mostly near-vertical with some
/// horizontals and diagonals mixed in.
fn synthetic_segments(count: usize) -> Vec<LineSegment> {
    (0..count)
        .map(|i| {
            let jitter = (i as f64 * 0.618).sin() * 3.0;
            let angle = match i % 5 {
                0 => 45.0 + jitter,
                1 | 2 => jitter,
                _ => 90.0 - 1.5 + jitter,
            };
            let radians = angle.to_radians();
            let x = (i % 40) as f64 * 12.0;
            let y = (i / 40) as f64 * 12.0;
            LineSegment::new(x, y, x + 120.0 * radians.cos(), y + 120.0 * radians.sin())
        })
        .collect()
}

fn bench_classify(c: &mut Criterion) {
    let classifier = LineClassifier::default();
    let mut group = c.benchmark_group("classify");

    for count in [50usize, 500, 5000] {
        let segments = synthetic_segments(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &segments, |b, segments| {
            b.iter(|| classifier.classify(black_box(segments)))
        });
    }
    group.finish();
}

fn bench_estimate(c: &mut Criterion) {
    let classified = LineClassifier::default().classify(&synthetic_segments(500));
    let estimator = TiltEstimator::default();

    c.bench_function("estimate_500", |b| {
        b.iter(|| estimator.estimate(black_box(&classified.buckets)))
    });
}

fn bench_outliers(c: &mut Criterion) {
    let samples: Vec<f64> = (0..1000).map(|i| 1.0 + (i as f64 * 0.37).cos()).collect();

    c.bench_function("reject_outliers_1000", |b| {
        b.iter(|| reject_outliers(black_box(&samples), 2.0, 3))
    });
}

fn bench_aggregate(c: &mut Criterion) {
    let estimates: Vec<TiltEstimate> = (0..64)
        .map(|i| TiltEstimate::uncompensated(1.0 + (i % 7) as f64 * 0.3, 0.2, 0.3 + (i % 5) as f64 * 0.1, 12))
        .collect();

    c.bench_function("aggregate_64", |b| b.iter(|| aggregate(black_box(&estimates), 0.4)));
}

criterion_group!(benches, bench_classify, bench_estimate, bench_outliers, bench_aggregate);
criterion_main!(benches);
