use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use tempfile::TempDir;
use valuecache::{LruEngine, TieredCache};
use valuestore::FileValueStore;

fn file_cache(dir: &TempDir, capacity: usize) -> TieredCache {
    let store = FileValueStore::open(dir.path().join("bench.log")).unwrap();
    TieredCache::builder()
        .store(Arc::new(store))
        .capacity(capacity)
        .build()
}

fn bench_cached_read(c: &mut Criterion) {
    let mut group = c.benchmark_group("cached_read");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("read_1kb_cached", |b| {
        let dir = TempDir::new().unwrap();
        let cache = file_cache(&dir, 1000);
        let value = "x".repeat(1024);

        let keys: Vec<String> = (0..100).map(|i| format!("key{}", i)).collect();
        for key in &keys {
            cache.put(key, &value).unwrap();
        }

        let mut counter = 0;
        b.iter(|| {
            black_box(cache.read(&keys[counter % 100]).unwrap());
            counter += 1;
        });
    });

    group.finish();
}

fn bench_mixed_50_50(c: &mut Criterion) {
    let mut group = c.benchmark_group("mixed");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("50_read_50_write_cached", |b| {
        let dir = TempDir::new().unwrap();
        let cache = file_cache(&dir, 1000);
        let value = "x".repeat(1024);

        let keys: Vec<String> = (0..100).map(|i| format!("key{}", i)).collect();
        for key in &keys {
            cache.put(key, &value).unwrap();
        }

        let mut counter = 0usize;
        b.iter(|| {
            let key = &keys[counter % 100];
            if counter % 2 == 0 {
                black_box(cache.read(key).ok());
            } else {
                black_box(cache.put(key, &value).ok());
            }
            counter += 1;
        });
    });

    group.finish();
}

fn bench_cache_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache_miss");
    group.sample_size(50);
    group.throughput(Throughput::Elements(1));

    group.bench_function("read_1kb_miss", |b| {
        let dir = TempDir::new().unwrap();
        let cache = file_cache(&dir, 10); // Small cache
        let value = "x".repeat(1024);

        let keys: Vec<String> = (0..100).map(|i| format!("key{}", i)).collect();
        for key in &keys {
            cache.put(key, &value).unwrap();
        }

        let mut counter = 0;
        b.iter(|| {
            // Cycling through 100 keys with room for 10 always misses
            black_box(cache.read(&keys[counter % 100]).unwrap());
            counter += 1;
        });
    });

    group.finish();
}

fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(1));

    group.bench_function("put_evicting", |b| {
        let mut engine = LruEngine::new(1024);
        let mut counter = 0u64;
        b.iter(|| {
            black_box(engine.put(counter, counter));
            counter += 1;
        });
    });

    group.bench_function("get_hit", |b| {
        let mut engine = LruEngine::new(1024);
        for i in 0..1024u64 {
            engine.put(i, i);
        }
        let mut counter = 0u64;
        b.iter(|| {
            black_box(engine.get(&(counter % 1024)).copied());
            counter += 1;
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_cached_read,
    bench_mixed_50_50,
    bench_cache_miss,
    bench_engine
);
criterion_main!(benches);
