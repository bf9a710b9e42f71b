//! Criterion benchmarks for cdb construction and lookup.
//!
//! Run with:
//!   cargo bench --bench lookup
//!
//! Databases are built into in-memory buffers so the numbers measure the
//! codec and probe loop, not the filesystem.

use std::io::Cursor;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cdb::{Pair, Pair32, Pair64, Reader, Writer};

const RECORDS: usize = 10_000;

fn build_db<P: Pair>(n: usize) -> Vec<u8> {
    let mut writer = Writer::<_, P>::new(Cursor::new(Vec::new())).unwrap();
    for i in 0..n {
        writer
            .put(format!("key/{i}").as_bytes(), format!("value-{i}").as_bytes())
            .unwrap();
    }
    writer.finalize().unwrap().into_inner()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[1_000usize, 10_000] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("pair32", n), &n, |b, &n| {
            b.iter(|| build_db::<Pair32>(n))
        });
        group.bench_with_input(BenchmarkId::new("pair64", n), &n, |b, &n| {
            b.iter(|| build_db::<Pair64>(n))
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");

    let narrow = build_db::<Pair32>(RECORDS);
    let wide = build_db::<Pair64>(RECORDS);
    let narrow_reader = Reader::<Pair32>::new(&narrow).unwrap();
    let wide_reader = Reader::<Pair64>::new(&wide).unwrap();

    group.bench_function("hit/pair32", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 7919) % RECORDS;
            narrow_reader.get(format!("key/{i}").as_bytes()).unwrap()
        })
    });
    group.bench_function("hit/pair64", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 7919) % RECORDS;
            wide_reader.get(format!("key/{i}").as_bytes()).unwrap()
        })
    });
    group.bench_function("miss/pair32", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i += 1;
            narrow_reader.get(format!("nokey/{i}").as_bytes())
        })
    });
    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");
    let data = build_db::<Pair32>(RECORDS);
    let reader = Reader::<Pair32>::new(&data).unwrap();

    group.throughput(Throughput::Elements(RECORDS as u64));
    group.bench_function("records/pair32", |b| {
        b.iter(|| {
            let mut bytes = 0usize;
            for (key, value) in reader.iter() {
                bytes += key.len() + value.len();
            }
            bytes
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_get, bench_iterate);
criterion_main!(benches);
