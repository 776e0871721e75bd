//! Benchmarks for BitArray hot paths.
//!
//! Sizes cover a single word, a typical validator set and a large population
//! so that the per-word loops and the lock overhead can be told apart.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use sharedbits::BitArray;

const SIZES: [usize; 3] = [64, 1024, 65536];
const SEED: u64 = 42;

fn random_array(n: usize, pct: f64, rng: &mut impl Rng) -> BitArray {
    let ba = BitArray::new(n).unwrap();
    for i in 0..n {
        if rng.gen_bool(pct) {
            ba.set(i, true);
        }
    }
    ba
}

// =============================================================================
// Single Bit Operations
// =============================================================================

fn bench_set_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_get");

    group.bench_function("set", |b| {
        let ba = BitArray::new(1024).unwrap();
        let mut i = 0;
        b.iter(|| {
            ba.set(black_box(i % 1024), true);
            i += 1;
        });
    });

    group.bench_function("get", |b| {
        let ba = BitArray::new(1024).unwrap();
        ba.set(100, true);
        b.iter(|| black_box(ba.get(black_box(100))));
    });

    group.finish();
}

// =============================================================================
// Algebra
// =============================================================================

fn bench_algebra(c: &mut Criterion) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(SEED);
    let mut group = c.benchmark_group("algebra");

    for &n in &SIZES {
        let a = random_array(n, 0.3, &mut rng);
        let b = random_array(n / 2 + 1, 0.3, &mut rng);

        group.bench_with_input(BenchmarkId::new("or", n), &n, |bench, _| {
            bench.iter(|| black_box(a.or(&b)));
        });
        group.bench_with_input(BenchmarkId::new("and", n), &n, |bench, _| {
            bench.iter(|| black_box(a.and(&b)));
        });
        group.bench_with_input(BenchmarkId::new("sub", n), &n, |bench, _| {
            bench.iter(|| black_box(a.sub(&b)));
        });
        group.bench_with_input(BenchmarkId::new("num_bits_set", n), &n, |bench, _| {
            bench.iter(|| black_box(a.num_bits_set()));
        });
    }

    group.finish();
}

// =============================================================================
// Random Pick and Serialization
// =============================================================================

fn bench_pick_random(c: &mut Criterion) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(SEED);
    let mut group = c.benchmark_group("pick_random");

    for &n in &SIZES {
        let sparse = random_array(n, 0.01, &mut rng);
        sparse.set(n - 1, true);
        group.bench_with_input(BenchmarkId::new("sparse", n), &n, |bench, _| {
            bench.iter(|| black_box(sparse.pick_random_with(&mut rng)));
        });
    }

    group.finish();
}

fn bench_bytes(c: &mut Criterion) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(SEED);
    let ba = random_array(65536, 0.5, &mut rng);

    c.bench_function("bytes_65536", |b| b.iter(|| black_box(ba.bytes())));
    c.bench_function("from_bytes_65536", |b| {
        let bytes = ba.bytes();
        b.iter(|| black_box(BitArray::from_bytes(65536, &bytes).unwrap()))
    });
}

criterion_group!(
    benches,
    bench_set_get,
    bench_algebra,
    bench_pick_random,
    bench_bytes
);
criterion_main!(benches);
