//! Mutation-cost benchmarks: publishing a new version via `insert` /
//! `insert_or_assign` / `delete`, at a range of tree sizes, compared against
//! `im::OrdMap` — the closest off-the-shelf persistent ordered map, and a
//! natural baseline for "how much does path-copying one more version cost".

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::{rng, Rng};

use im::OrdMap as ImOrdMap;
use prbt::PersistentMap;

const TREE_SIZES: [usize; 4] = [1 << 8, 1 << 10, 1 << 12, 1 << 14];

fn populated(size: usize) -> (PersistentMap<usize, usize>, prbt::VersionId) {
    let mut map = PersistentMap::new();
    let mut v = map.current();
    for i in 0..size {
        v = map.insert(v, i, i).unwrap().0;
    }
    (map, v)
}

pub fn insert_new_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_new_key");
    group.throughput(Throughput::Elements(1));

    for size in TREE_SIZES {
        group.bench_with_input(BenchmarkId::new("prbt", size), &size, |b, &size| {
            let (map, v) = populated(size);
            let mut map = map;
            let mut rng = rng();
            b.iter(|| {
                let key = size + rng.random_range(0..size.max(1));
                std::hint::black_box(map.insert(v, key, key).unwrap());
            })
        });

        group.bench_with_input(BenchmarkId::new("im_ordmap", size), &size, |b, &size| {
            let mut base = ImOrdMap::new();
            for i in 0..size {
                base = base.update(i, i);
            }
            let mut rng = rng();
            b.iter(|| {
                let key = size + rng.random_range(0..size.max(1));
                std::hint::black_box(base.update(key, key));
            })
        });
    }

    group.finish();
}

pub fn insert_or_assign_existing_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("insert_or_assign_existing_key");
    group.throughput(Throughput::Elements(1));

    for size in TREE_SIZES {
        group.bench_with_input(BenchmarkId::new("prbt", size), &size, |b, &size| {
            let (mut map, v) = populated(size);
            let mut rng = rng();
            b.iter(|| {
                let key = rng.random_range(0..size);
                std::hint::black_box(map.insert_or_assign(v, key, key * 2).unwrap());
            })
        });

        group.bench_with_input(BenchmarkId::new("im_ordmap", size), &size, |b, &size| {
            let mut base = ImOrdMap::new();
            for i in 0..size {
                base = base.update(i, i);
            }
            let mut rng = rng();
            b.iter(|| {
                let key = rng.random_range(0..size);
                std::hint::black_box(base.update(key, key * 2));
            })
        });
    }

    group.finish();
}

pub fn delete_existing_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete_existing_key");
    group.throughput(Throughput::Elements(1));

    for size in TREE_SIZES {
        group.bench_with_input(BenchmarkId::new("prbt", size), &size, |b, &size| {
            let (mut map, v) = populated(size);
            let mut rng = rng();
            b.iter(|| {
                let key = rng.random_range(0..size);
                std::hint::black_box(map.delete(v, &key).unwrap());
            })
        });

        group.bench_with_input(BenchmarkId::new("im_ordmap", size), &size, |b, &size| {
            let mut base = ImOrdMap::new();
            for i in 0..size {
                base = base.update(i, i);
            }
            let mut rng = rng();
            b.iter(|| {
                let key = rng.random_range(0..size);
                std::hint::black_box(base.without(&key));
            })
        });
    }

    group.finish();
}

/// The scenario path-copying with structural sharing is built for: one base
/// version, many independent snapshots mutated off it. `im::OrdMap` pays a
/// full structural copy per `.clone()` the same way a non-persistent tree
/// would pay per deep copy; `prbt` shares everything the snapshot didn't
/// touch.
pub fn many_versions_off_one_base(c: &mut Criterion) {
    let mut group = c.benchmark_group("many_versions_off_one_base");
    let base_size = 2_000;
    let version_counts = [10, 50, 100];

    for count in version_counts {
        group.bench_with_input(BenchmarkId::new("prbt", count), &count, |b, &count| {
            b.iter(|| {
                let (mut map, base) = populated(base_size);
                for i in 0..count {
                    let key = base_size + i;
                    std::hint::black_box(map.insert(base, key, key).unwrap());
                }
            })
        });

        group.bench_with_input(BenchmarkId::new("im_ordmap", count), &count, |b, &count| {
            b.iter(|| {
                let mut base = ImOrdMap::new();
                for i in 0..base_size {
                    base = base.update(i, i);
                }
                for i in 0..count {
                    let key = base_size + i;
                    std::hint::black_box(base.clone().update(key, key));
                }
            })
        });
    }

    group.finish();
}

criterion_group!(
    mutation_benches,
    insert_new_key,
    insert_or_assign_existing_key,
    delete_existing_key,
    many_versions_off_one_base
);
criterion_main!(mutation_benches);
