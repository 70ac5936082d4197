#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]
//! Benchmark for workload generation: inflation, jitter, and ingestion.

use catalog_bench::catalog::{inflate, jitter, rounds_to_reach, Bounds, Catalog, CatalogRecord, FieldValue, Schema};
use catalog_bench::store::MemoryStore;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn base_catalog(rows: usize) -> Catalog {
    let schema = Schema::new(["objid", "mag_r", "redshift"]);
    let records = (0..rows)
        .map(|i| {
            CatalogRecord::new(vec![
                FieldValue::Int(i as i64),
                FieldValue::Float(14.0 + (i % 90) as f64 * 0.1),
                FieldValue::Float((i % 40) as f64 * 0.01),
            ])
        })
        .collect();
    Catalog::new(schema, records)
}

fn inflate_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("inflate");
    let base = base_catalog(1_000);

    for target in [1_000, 10_000, 100_000] {
        let rounds = rounds_to_reach(base.len(), target).expect("target is reachable");
        group.bench_with_input(BenchmarkId::from_parameter(target), &rounds, |b, &rounds| {
            b.iter(|| inflate(black_box(&base), rounds).expect("inflation should succeed").prefix(target));
        });
    }

    group.finish();
}

fn jitter_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("jitter");

    for size in [1_000, 10_000, 100_000] {
        let catalog = base_catalog(size);
        let mut rng = StdRng::seed_from_u64(42);
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            b.iter(|| jitter(black_box(catalog), Bounds::default(), &mut rng));
        });
    }

    group.finish();
}

fn store_insert_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_insert");

    for size in [1_000, 10_000, 100_000] {
        let catalog = jitter(&base_catalog(size), Bounds::default(), &mut StdRng::seed_from_u64(7));
        group.bench_with_input(BenchmarkId::from_parameter(size), &catalog, |b, catalog| {
            let store = MemoryStore::new();
            b.iter(|| {
                store.insert(black_box(catalog)).expect("insert should succeed");
                store.reset();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, inflate_benchmark, jitter_benchmark, store_insert_benchmark);
criterion_main!(benches);
