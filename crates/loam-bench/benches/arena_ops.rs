//! Criterion micro-benchmarks for bump allocation, demand commit, reset
//! reuse, and scratch round-trips.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use loam_arena::kib;
use loam_bench::{reference_arena, small_arena, ALLOC_SIZES};

fn bench_alloc(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc");
    for size in ALLOC_SIZES {
        group.bench_function(format!("bump_{size}b"), |b| {
            let mut arena = reference_arena();
            b.iter(|| {
                if arena.remaining() < size + 64 {
                    arena.reset();
                }
                black_box(arena.alloc(black_box(size), 8).unwrap())
            });
        });
    }
    group.finish();
}

fn bench_alloc_zeroed(c: &mut Criterion) {
    c.bench_function("alloc_zeroed_4k", |b| {
        let mut arena = reference_arena();
        b.iter(|| {
            if arena.remaining() < kib(8) {
                arena.reset();
            }
            black_box(arena.alloc_zeroed(kib(4), 8).unwrap())
        });
    });
}

fn bench_first_touch_commit(c: &mut Criterion) {
    // Reset retains committed pages, so only the first pass over an
    // arena pays mprotect. Recreate the arena each iteration to measure
    // that cold path, reservation included.
    c.bench_function("commit_cold_512k", |b| {
        b.iter(|| {
            let mut arena = small_arena();
            let _ = black_box(arena.alloc(kib(512), 8).unwrap());
            arena
        });
    });
}

fn bench_scratch_round_trip(c: &mut Criterion) {
    c.bench_function("scratch_roundtrip_8x64b", |b| {
        let mut arena = reference_arena();
        let _ = arena.alloc(kib(1), 8).unwrap();
        b.iter(|| {
            let mut scratch = arena.scratch();
            for _ in 0..8 {
                let _ = black_box(scratch.alloc(64, 8).unwrap());
            }
        });
    });
}

fn bench_realloc_doubling(c: &mut Criterion) {
    c.bench_function("realloc_double_to_4k", |b| {
        let mut arena = reference_arena();
        b.iter(|| {
            if arena.remaining() < kib(16) {
                arena.reset();
            }
            let mut buf = arena.alloc(64, 8).unwrap();
            while buf.len() < kib(4) {
                buf = arena.realloc(buf, buf.len() * 2, 8).unwrap();
            }
            black_box(buf)
        });
    });
}

criterion_group!(
    benches,
    bench_alloc,
    bench_alloc_zeroed,
    bench_first_touch_commit,
    bench_scratch_round_trip,
    bench_realloc_doubling
);
criterion_main!(benches);
