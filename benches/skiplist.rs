//! Benchmarks for [`SkipList`].

use criterion::{AxisScale, BatchSize, BenchmarkId, Criterion, PlotConfiguration, black_box};
use rand::prelude::*;
use skipkv::SkipList;

/// Benchmarking sizes
const SIZES: [usize; 6] = [1, 10, 100, 1000, 10_000, 100_000];

/// Benchmarking insertion
pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut sl: SkipList<usize, usize> = std::iter::repeat_with(|| (rng.random(), 0))
                .take(size)
                .collect();

            b.iter(|| {
                black_box(sl.insert(rng.random(), rng.random()).is_ok());
            });
        });
    }
}

/// Benchmarking random access
pub fn rand_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Random Access");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let sl: SkipList<usize, usize> = (0..size).map(|k| (k, rng.random())).collect();
            let keys: Vec<usize> = std::iter::repeat_with(|| rng.random_range(0..size))
                .take(10)
                .collect();

            b.iter(|| {
                for key in &keys {
                    black_box(sl.get(key));
                }
            });
        });
    }
}

/// Benchmarking removal
pub fn remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("SkipList Remove");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let sl: SkipList<usize, usize> = (0..size).map(|k| (k, k)).collect();

            b.iter_batched(
                || (sl.clone(), rng.random_range(0..size)),
                |(mut sl, key)| black_box(sl.remove(&key)),
                BatchSize::LargeInput,
            );
        });
    }
}

/// Benchmarking iteration
pub fn iter(c: &mut Criterion) {
    c.bench_function("SkipList Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let sl: SkipList<usize, usize> = std::iter::repeat_with(|| (rng.random(), rng.random()))
            .take(100_000)
            .collect();

        b.iter(|| {
            for el in &sl {
                black_box(el);
            }
        });
    });
}

/// Benchmarking consuming iteration
pub fn into_iter(c: &mut Criterion) {
    c.bench_function("SkipList IntoIter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let sl: SkipList<usize, usize> = std::iter::repeat_with(|| (rng.random(), rng.random()))
            .take(100_000)
            .collect();

        b.iter_batched(
            || sl.clone(),
            |sl| {
                for el in sl {
                    black_box(el);
                }
            },
            BatchSize::LargeInput,
        );
    });
}
