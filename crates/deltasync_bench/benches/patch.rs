//! Diff and patch benchmarks.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use deltasync_bench::{changed_document, random_document};
use deltasync_protocol::{apply, diff, Patch};

/// Benchmark diffing documents with a varying number of changed leaves.
fn bench_diff(c: &mut Criterion) {
    let mut group = c.benchmark_group("diff");
    let base = random_document();

    for changes in [0, 1, 4, 8] {
        let target = changed_document(&base, changes);
        group.bench_with_input(BenchmarkId::from_parameter(changes), &target, |b, target| {
            b.iter(|| black_box(diff(black_box(&base), black_box(target))));
        });
    }

    group.finish();
}

/// Benchmark applying patches of varying size.
fn bench_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("apply");
    let base = random_document();

    for changes in [1, 4, 8] {
        let patch = diff(&base, &changed_document(&base, changes));
        group.bench_with_input(BenchmarkId::from_parameter(changes), &patch, |b, patch| {
            b.iter(|| black_box(apply(black_box(&base), black_box(patch)).unwrap()));
        });
    }

    group.finish();
}

/// Benchmark the patch wire format.
fn bench_wire(c: &mut Criterion) {
    let mut group = c.benchmark_group("wire");
    let base = random_document();
    let patch = diff(&base, &changed_document(&base, 8));
    let bytes = patch.to_json().unwrap();

    group.bench_function("encode", |b| {
        b.iter(|| black_box(patch.to_json().unwrap()));
    });
    group.bench_function("decode", |b| {
        b.iter(|| black_box(Patch::from_json(black_box(&bytes)).unwrap()));
    });

    group.finish();
}

criterion_group!(benches, bench_diff, bench_apply, bench_wire);
criterion_main!(benches);
