//! Benchmarks for the Standard Library's [`BTreeMap`], used as the baseline
//! for the skiplist benchmarks.
//!
//! Insertion goes through `entry().or_insert_with` rather than `insert`, so
//! that an existing key keeps its value just as [`SkipList::insert`] rejects
//! it. Both sides then measure the same search plus conditional insert.
//!
//! [`SkipList::insert`]: skipkv::SkipList::insert

use std::collections::BTreeMap;

use criterion::{AxisScale, BenchmarkId, Criterion, PlotConfiguration, black_box};
use rand::prelude::*;

/// Benchmarking sizes
const SIZES: [usize; 6] = [1, 10, 100, 1000, 10_000, 100_000];

/// Benchmarking insertion
pub fn insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("BTreeMap Insert");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let mut map: BTreeMap<usize, usize> = std::iter::repeat_with(|| rng.random())
                .take(size)
                .collect();

            b.iter(|| {
                map.entry(rng.random()).or_insert_with(|| rng.random());
            });
        });
    }
}

/// Benchmarking random access
pub fn rand_access(c: &mut Criterion) {
    let mut group = c.benchmark_group("BTreeMap Random Access");
    group.plot_config(PlotConfiguration::default().summary_scale(AxisScale::Logarithmic));

    for size in SIZES {
        group.bench_function(BenchmarkId::from_parameter(size), |b| {
            let mut rng = StdRng::seed_from_u64(0x1234_abcd);
            let map: BTreeMap<usize, usize> = (0..size).map(|k| (k, rng.random())).collect();
            let keys: Vec<usize> = std::iter::repeat_with(|| rng.random_range(0..size))
                .take(10)
                .collect();

            b.iter(|| {
                for key in &keys {
                    black_box(map.get(key));
                }
            });
        });
    }
}

/// Benchmarking iteration
pub fn iter(c: &mut Criterion) {
    c.bench_function("BTreeMap Iter", |b| {
        let mut rng = StdRng::seed_from_u64(0x1234_abcd);
        let map: BTreeMap<usize, usize> = std::iter::repeat_with(|| (rng.random(), rng.random()))
            .take(100_000)
            .collect();

        b.iter(|| {
            for el in &map {
                black_box(el);
            }
        });
    });
}
