//! # Guard Benchmarks
//!
//! | Component | Operation | Target |
//! |-----------|-----------|--------|
//! | Name filters | `contains` on a 100k filter | < 1µs |
//! | Name filters | `might_contain` through the registry | < 5µs |
//! | Permission cache | fresh `get` | < 1µs |

use std::sync::Arc;

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::distributions::Alphanumeric;
use rand::Rng;

use av_01_permission_cache::{AccessLevel, PermissionCache, PermissionCacheConfig, ResourceGrant};
use av_02_name_filters::{
    BloomFilter, HashScheme, InMemoryFilterStore, NameSource, RegistryConfig, SourceError,
    TenantFilterRegistry,
};

fn random_names(count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|_| {
            let stem: String = (&mut rng)
                .sample_iter(&Alphanumeric)
                .take(12)
                .map(char::from)
                .collect();
            format!("{}.png", stem)
        })
        .collect()
}

// ============================================================================
// Probabilistic set
// ============================================================================

fn bench_bloom_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("av-02-bloom-filter");
    let names = random_names(100_000);

    for scheme in [HashScheme::DoubleMurmur, HashScheme::Polynomial] {
        let mut filter = BloomFilter::new_with_fpr(100_000, 0.01, scheme);
        for name in &names {
            filter.insert(name);
        }

        group.bench_with_input(BenchmarkId::new("contains", scheme), &filter, |b, filter| {
            let mut i = 0;
            b.iter(|| {
                i = (i + 1) % names.len();
                black_box(filter.contains(&names[i]))
            })
        });
    }

    group.throughput(Throughput::Elements(names.len() as u64));
    group.bench_function("build_100k", |b| {
        b.iter(|| {
            let mut filter = BloomFilter::new_with_fpr(100_000, 0.01, HashScheme::DoubleMurmur);
            for name in &names {
                filter.insert(name);
            }
            black_box(filter.bits_set())
        })
    });

    group.finish();
}

// ============================================================================
// Tenant filter registry
// ============================================================================

struct StaticNames(Vec<String>);

#[async_trait]
impl NameSource for StaticNames {
    async fn list_names(&self, _tenant: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.0.clone())
    }

    async fn exists_by_name_and_tenant(&self, _name: &str, _tenant: &str) -> Result<bool, SourceError> {
        Ok(true)
    }
}

fn bench_registry(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let names = random_names(10_000);
    let (registry, _worker) = TenantFilterRegistry::new(
        Arc::new(StaticNames(names.clone())),
        Arc::new(InMemoryFilterStore::new()),
        RegistryConfig::default(),
    )
    .unwrap();
    runtime.block_on(registry.might_contain("org/docs", "warmup"));

    c.bench_function("av-02-registry/might_contain", |b| {
        let mut i = 0;
        b.iter(|| {
            i = (i + 1) % names.len();
            black_box(runtime.block_on(registry.might_contain("org/docs", &names[i])))
        })
    });
}

// ============================================================================
// Permission cache
// ============================================================================

fn bench_permission_cache(c: &mut Criterion) {
    let cache = PermissionCache::new(PermissionCacheConfig::default()).unwrap();
    let grants: Vec<_> = (0..50)
        .map(|i| ResourceGrant::new(format!("org/repo-{}", i), AccessLevel::Write))
        .collect();
    for user in 0..1_000 {
        cache.set(&format!("user-{}", user), grants.clone());
    }

    let mut group = c.benchmark_group("av-01-permission-cache");
    group.bench_function("get_fresh", |b| {
        b.iter(|| black_box(cache.get("user-500")))
    });
    group.bench_function("level_for", |b| {
        b.iter(|| black_box(cache.level_for("user-500", "org/repo-49")))
    });
    group.bench_function("update_incremental", |b| {
        let batch = vec![ResourceGrant::new("org/repo-7", AccessLevel::Admin)];
        b.iter(|| cache.update_incremental("user-1", batch.clone()))
    });
    group.finish();
}

criterion_group!(benches, bench_bloom_filter, bench_registry, bench_permission_cache);
criterion_main!(benches);
