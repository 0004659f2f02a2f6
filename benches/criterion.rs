use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use holdout::{
    autodiff::Tape,
    dataset,
    harness::{self, Hyperparameters},
    model::{Activation, Mlp},
};
use rand::{rngs::StdRng, SeedableRng};
use rand_distr::StandardNormal;

fn fit(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(12345u64);
    let mut group = c.benchmark_group("fit");
    for size in [50, 100, 200] {
        let samples = dataset::two_clusters(size, 0.4, &mut rng).unwrap();
        let (train, test) = dataset::split(&samples, 0.8, &mut rng).unwrap();
        let hyper = Hyperparameters {
            learning_rate: 0.02,
            momentum: 0.9,
            epochs: 20,
        };
        group.bench_with_input(BenchmarkId::new("mlp", size), &size, |b, _| {
            b.iter(|| {
                let tape = Tape::default();
                let mut mlp =
                    Mlp::rand(&tape, &mut rng, StandardNormal, Activation::Tanh, &[2, 8, 1])
                        .unwrap();
                black_box(harness::fit(&mut mlp, &train, &test, &hyper).unwrap())
            })
        });
    }
    group.finish();
}

criterion_group!(bench_fit, fit);
criterion_main!(bench_fit);
