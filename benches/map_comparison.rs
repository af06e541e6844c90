use core::hint::black_box;

use criterion::BatchSize;
use criterion::Criterion;
use criterion::Throughput;
use criterion::criterion_group;
use criterion::criterion_main;
use dense_hash::DenseMap;
use rand::seq::SliceRandom;

const SIZES: &[usize] = &[
    ((1 << 10) as f32 * 0.79) as usize,
    ((1 << 15) as f32 * 0.79) as usize,
    ((1 << 19) as f32 * 0.79) as usize,
];

fn make_pairs(size: usize) -> Vec<(String, u64)> {
    (0..size)
        .map(|i| (format!("key_{}", i), i as u64))
        .collect()
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert");

    for &size in SIZES {
        let pairs = make_pairs(size);
        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("dense_hash/{}", size), |b| {
            b.iter(|| {
                let mut map = DenseMap::new();
                for (key, value) in &pairs {
                    map.insert(key.clone(), *value);
                }
                black_box(map.len())
            })
        });

        group.bench_function(format!("std/{}", size), |b| {
            b.iter(|| {
                let mut map = std::collections::HashMap::new();
                for (key, value) in &pairs {
                    map.insert(key.clone(), *value);
                }
                black_box(map.len())
            })
        });

        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| {
                let mut map = hashbrown::HashMap::new();
                for (key, value) in &pairs {
                    map.insert(key.clone(), *value);
                }
                black_box(map.len())
            })
        });
    }

    group.finish();
}

fn bench_lookup_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_hit");

    for &size in SIZES {
        let pairs = make_pairs(size);
        let mut keys: Vec<&String> = pairs.iter().map(|(key, _)| key).collect();
        keys.shuffle(&mut rand::rng());
        group.throughput(Throughput::Elements(size as u64));

        let dense: DenseMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("dense_hash/{}", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for key in &keys {
                    sum += dense.get(key.as_str()).copied().unwrap_or(0);
                }
                black_box(sum)
            })
        });

        let std_map: std::collections::HashMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("std/{}", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for key in &keys {
                    sum += std_map.get(key.as_str()).copied().unwrap_or(0);
                }
                black_box(sum)
            })
        });

        let brown: hashbrown::HashMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for key in &keys {
                    sum += brown.get(key.as_str()).copied().unwrap_or(0);
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}

fn bench_lookup_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup_miss");

    for &size in SIZES {
        let pairs = make_pairs(size);
        let missing: Vec<String> = (0..size).map(|i| format!("missing_{}", i)).collect();
        group.throughput(Throughput::Elements(size as u64));

        let dense: DenseMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("dense_hash/{}", size), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for key in &missing {
                    hits += usize::from(dense.contains_key(key.as_str()));
                }
                black_box(hits)
            })
        });

        let std_map: std::collections::HashMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("std/{}", size), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for key in &missing {
                    hits += usize::from(std_map.contains_key(key.as_str()));
                }
                black_box(hits)
            })
        });

        let brown: hashbrown::HashMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| {
                let mut hits = 0usize;
                for key in &missing {
                    hits += usize::from(brown.contains_key(key.as_str()));
                }
                black_box(hits)
            })
        });
    }

    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterate");

    for &size in SIZES {
        let pairs = make_pairs(size);
        group.throughput(Throughput::Elements(size as u64));

        let dense: DenseMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("dense_hash/{}", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for (_, value) in dense.iter() {
                    sum += value;
                }
                black_box(sum)
            })
        });

        let std_map: std::collections::HashMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("std/{}", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for (_, value) in std_map.iter() {
                    sum += value;
                }
                black_box(sum)
            })
        });

        let brown: hashbrown::HashMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter(|| {
                let mut sum = 0u64;
                for (_, value) in brown.iter() {
                    sum += value;
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}

fn bench_remove(c: &mut Criterion) {
    let mut group = c.benchmark_group("remove");

    for &size in SIZES {
        let pairs = make_pairs(size);
        let mut keys: Vec<String> = pairs.iter().map(|(key, _)| key.clone()).collect();
        keys.shuffle(&mut rand::rng());
        group.throughput(Throughput::Elements(size as u64));

        let dense: DenseMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("dense_hash/{}", size), |b| {
            b.iter_batched(
                || dense.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(key.as_str()));
                    }
                    map
                },
                BatchSize::LargeInput,
            )
        });

        let std_map: std::collections::HashMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("std/{}", size), |b| {
            b.iter_batched(
                || std_map.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(key.as_str()));
                    }
                    map
                },
                BatchSize::LargeInput,
            )
        });

        let brown: hashbrown::HashMap<String, u64> = pairs.iter().cloned().collect();
        group.bench_function(format!("hashbrown/{}", size), |b| {
            b.iter_batched(
                || brown.clone(),
                |mut map| {
                    for key in &keys {
                        black_box(map.remove(key.as_str()));
                    }
                    map
                },
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_insert,
    bench_lookup_hit,
    bench_lookup_miss,
    bench_iterate,
    bench_remove
);
criterion_main!(benches);
