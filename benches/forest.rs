use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use gradecast::dataset::{Dataset, Outcome, StudentFeatures, StudentRecord};
use gradecast::model::{TrainOptions, train_models};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const ROW_COUNT: usize = 1_000;

fn synthetic_dataset() -> Dataset {
    let mut rng = StdRng::seed_from_u64(11);
    let records = (0..ROW_COUNT)
        .map(|_| {
            let features = StudentFeatures {
                attendance: rng.random_range(50.0..100.0),
                previous_cgpa: rng.random_range(4.0..10.0),
                study_hours: rng.random_range(0.0..60.0),
                assignments: rng.random_range(0.0..100.0),
                mid1_marks: rng.random_range(0.0..150.0),
                mid2_marks: rng.random_range(0.0..150.0),
                quiz_scores: rng.random_range(0.0..30.0),
            };
            let percentage = (0.4 * features.attendance
                + 0.2 * (features.mid1_marks + features.mid2_marks))
                .clamp(0.0, 100.0);
            StudentRecord {
                features,
                outcome: if percentage >= 40.0 {
                    Outcome::Pass
                } else {
                    Outcome::Fail
                },
                semester_percentage: percentage,
            }
        })
        .collect();
    Dataset::from_records(records)
}

fn bench_train_models(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let mut group = c.benchmark_group("train_models");
    group.sample_size(10);
    for n_trees in [25usize, 250] {
        let options = TrainOptions {
            n_trees,
            ..TrainOptions::default()
        };
        group.bench_with_input(BenchmarkId::from_parameter(n_trees), &options, |b, options| {
            b.iter(|| train_models(black_box(&dataset), options).expect("train models"));
        });
    }
    group.finish();
}

fn bench_predict(c: &mut Criterion) {
    let dataset = synthetic_dataset();
    let models = train_models(&dataset, &TrainOptions::default()).expect("train models");
    let query = dataset.records()[0].features;
    c.bench_function("predict", |b| b.iter(|| models.predict(black_box(&query))));
}

criterion_group!(benches, bench_train_models, bench_predict);
criterion_main!(benches);
