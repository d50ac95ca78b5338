use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use return_predictor::pipeline::{
    predict_windows, FeatureEngineer, InferenceContext, LinearSequenceModel, ResultFormatter,
    StandardScaler, WindowBuilder,
};
use return_predictor::types::{RawRecord, N_FEATURES, WINDOW_SIZE};

fn synthetic_rows(stocks: usize, days: usize) -> Vec<RawRecord> {
    let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    let mut rows = Vec::with_capacity(stocks * days);
    for s in 0..stocks {
        let mut price = 50.0 + s as f64;
        for d in 0..days {
            price *= 1.0 + 0.01 * ((d * 7 + s * 3) % 11) as f64 / 11.0 - 0.004;
            rows.push(RawRecord::new(
                start + Duration::days(d as i64),
                format!("S{:03}", s),
                price,
                price * 1.01,
                price * 0.99,
                price,
                1_000_000.0,
            ));
        }
    }
    rows
}

fn benchmark_feature_engineering(c: &mut Criterion) {
    let rows = synthetic_rows(50, 500);
    let engineer = FeatureEngineer::new();

    c.bench_function("features_50x500", |b| {
        b.iter(|| engineer.process(black_box(&rows)).unwrap());
    });
}

fn benchmark_windowing(c: &mut Criterion) {
    let frame = FeatureEngineer::new()
        .process(&synthetic_rows(50, 500))
        .unwrap();
    let builder = WindowBuilder::new(WINDOW_SIZE);

    c.bench_function("windows_50x500", |b| {
        b.iter(|| builder.build(black_box(&frame.records)));
    });
}

fn benchmark_predict_and_rank(c: &mut Criterion) {
    let frame = FeatureEngineer::new()
        .process(&synthetic_rows(20, 400))
        .unwrap();
    let scaler = StandardScaler::identity();
    let model = LinearSequenceModel::new(
        "bench",
        vec![vec![0.001; N_FEATURES]; WINDOW_SIZE],
        0.0,
    )
    .unwrap();
    let context = InferenceContext::new(&scaler, &model);

    c.bench_function("predict_rank_20x400", |b| {
        b.iter(|| {
            let forecast = predict_windows(black_box(&frame), &context).unwrap();
            ResultFormatter::new(&frame.encoding)
                .format(&forecast.targets, &forecast.predicted_log_returns)
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    benchmark_feature_engineering,
    benchmark_windowing,
    benchmark_predict_and_rank
);
criterion_main!(benches);
