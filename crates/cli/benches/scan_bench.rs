use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use config::StoreConfig;
use engine::FileStore;
use query::{CompareOp, Query};
use record::{LogRecord, LogType};
use tempfile::tempdir;

const N_RECORDS: usize = 10_000;

fn seed_store(store: &FileStore) {
    for i in 0..N_RECORDS {
        let kind = if i % 5 == 0 { LogType::Error } else { LogType::Info };
        let record = LogRecord::new(format!("event number {i}"), kind)
            .with_user(format!("user{}", i % 20))
            .with_id(format!("bench-{i}"));
        store.add(&record).unwrap();
    }
}

fn build_store() -> (tempfile::TempDir, FileStore) {
    let dir = tempdir().unwrap();
    let store = FileStore::new(StoreConfig::new(dir.path())).unwrap();
    seed_store(&store);
    (dir, store)
}

fn append_benchmark(c: &mut Criterion) {
    c.bench_function("append_10k", |b| {
        b.iter_batched(
            || {
                let dir = tempdir().unwrap();
                let store = FileStore::new(StoreConfig::new(dir.path())).unwrap();
                (dir, store)
            },
            |(_dir, store)| {
                seed_store(&store);
            },
            BatchSize::SmallInput,
        );
    });
}

fn full_scan_benchmark(c: &mut Criterion) {
    c.bench_function("full_scan_10k", |b| {
        b.iter_batched(
            build_store,
            |(_dir, store)| {
                let records = store.get(&Query::all()).unwrap();
                assert_eq!(records.len(), N_RECORDS);
            },
            BatchSize::LargeInput,
        );
    });
}

fn filtered_count_benchmark(c: &mut Criterion) {
    c.bench_function("filtered_count_10k", |b| {
        b.iter_batched(
            build_store,
            |(_dir, store)| {
                let q = Query::by_filter("type", CompareOp::Eq, serde_json::json!("error"));
                let n = store.count(&q).unwrap();
                assert_eq!(n as usize, N_RECORDS / 5);
            },
            BatchSize::LargeInput,
        );
    });
}

fn first_window_benchmark(c: &mut Criterion) {
    // Early termination: a first-N query should touch only the head of
    // the file, not all 10k records.
    c.bench_function("first_10_of_10k", |b| {
        b.iter_batched(
            build_store,
            |(_dir, store)| {
                let q = Query {
                    first: Some(10),
                    ..Query::default()
                };
                let records = store.get(&q).unwrap();
                assert_eq!(records.len(), 10);
            },
            BatchSize::LargeInput,
        );
    });
}

criterion_group!(
    benches,
    append_benchmark,
    full_scan_benchmark,
    filtered_count_benchmark,
    first_window_benchmark
);
criterion_main!(benches);
