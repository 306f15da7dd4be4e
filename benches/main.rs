//! Benchmarks comparing the skiplist against the standard library's ordered
//! map, plus a contended multi-threaded workload.

use criterion::{criterion_group, criterion_main};

mod btreemap;
mod skiplist;

criterion_group!(
    benches,
    btreemap::insert,
    btreemap::rand_access,
    btreemap::iter,
    skiplist::insert,
    skiplist::rand_access,
    skiplist::remove,
    skiplist::iter,
    skiplist::into_iter,
    concurrent::insert,
    concurrent::get,
);
criterion_main!(benches);
