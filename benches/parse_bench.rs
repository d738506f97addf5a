use criterion::{criterion_group, criterion_main, Criterion};

mod benchmark_dsl;
use benchmark_dsl::BenchmarkSuite;

/// Benchmarks the `convert` command end-to-end (I/O, structural validation,
/// interval conversion, JSON output) against a large synthetic daily-log
/// dataset.
fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    BenchmarkSuite::large_dataset_benchmark().add_to_group(&mut group, "large_dataset");
    group.finish();
}

/// Benchmarks `ingest` (convert + import in one pass), exercising the
/// importer's per-month replace transaction on the same dataset size.
fn bench_ingest(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest");
    BenchmarkSuite::large_ingest_benchmark().add_to_group(&mut group, "large_dataset");
    group.finish();
}

criterion_group!(benches, bench_convert, bench_ingest);
criterion_main!(benches);
