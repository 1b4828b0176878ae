//! Pooler adaptation: default-size convergence, lookahead and shared pools

use std::{collections::HashMap, sync::Arc};

use bytepool::{BucketPool, BucketPooler, PoolerConfig, PoolerExt, PoolerStats, SizeSet};
use rand::{rngs::StdRng, Rng, SeedableRng};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn linear_pool() -> Arc<BucketPool> {
    Arc::new(
        BucketPool::with_sizes(SizeSet::Linear {
            min: 512,
            max: 4096,
            buckets: 8,
        })
        .unwrap(),
    )
}

/// 80% of lengths fall in bucket `k`, the rest anywhere in range
fn skewed_len(rng: &mut StdRng, sizes: &[usize], k: usize) -> usize {
    if rng.gen_bool(0.8) {
        let low = if k == 0 { 0 } else { sizes[k - 1] + 1 };
        rng.gen_range(low..=sizes[k])
    } else {
        rng.gen_range(0..=sizes[sizes.len() - 1])
    }
}

#[cfg(test)]
mod pooler_tests {
    use super::*;

    #[test]
    fn test_default_converges_to_skew() {
        init_logging();
        let sizes = linear_pool().sizes();

        for k in [1, 4, 6] {
            let mut observed: HashMap<usize, usize> = HashMap::new();

            for seed in 0..5 {
                let mut rng = StdRng::seed_from_u64(seed);
                let config = PoolerConfig::default().with_choose_inc(100);
                let pooler = BucketPooler::new(linear_pool(), config).unwrap();

                for i in 0..2000 {
                    let len = skewed_len(&mut rng, &sizes, k);
                    let buf = pooler.get_filled(len);
                    pooler.put(buf);
                    if i >= 500 {
                        *observed.entry(pooler.default_size()).or_default() += 1;
                    }
                }
            }

            let (mode, _) = observed.iter().max_by_key(|(_, count)| **count).unwrap();
            assert_eq!(*mode, sizes[k], "skew toward bucket {}", k);
        }
    }

    #[test]
    fn test_default_follows_a_shift() {
        let pool = linear_pool();
        let sizes = pool.sizes();
        let pooler = BucketPooler::new(pool, PoolerConfig::default().with_choose_inc(50)).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..1000 {
            pooler.put(pooler.get_filled(skewed_len(&mut rng, &sizes, 0)));
        }
        assert_eq!(pooler.default_size(), 512);

        for _ in 0..1000 {
            pooler.put(pooler.get_filled(skewed_len(&mut rng, &sizes, 7)));
        }
        assert_eq!(pooler.default_size(), 4096);
    }

    #[test]
    fn test_poolers_share_buckets_but_not_defaults() {
        let pool = Arc::new(BucketPool::pow2(512, 4096).unwrap());
        let config = PoolerConfig::default().with_choose_inc(20);
        let small = BucketPooler::new(pool.clone(), config.clone()).unwrap();
        let large = BucketPooler::new(pool.clone(), config).unwrap();

        for _ in 0..100 {
            small.put(small.get_filled(600));
            large.put(large.get_filled(4000));
        }

        assert_eq!(small.default_size(), 1024);
        assert_eq!(large.default_size(), 4096);

        // both poolers released into the same buckets
        let stats = pool.stats();
        assert_eq!(stats.bucket(1024).unwrap().available, 1);
        assert_eq!(stats.bucket(4096).unwrap().available, 1);

        let buf = small.get();
        assert_eq!(buf.capacity(), 1024);
        let buf = large.get();
        assert_eq!(buf.capacity(), 4096);
    }

    #[test]
    fn test_lookahead_reuses_larger_idle_buffer() {
        let pool = Arc::new(BucketPool::pow2(512, 4096).unwrap());
        let pooler = BucketPooler::with_defaults(pool.clone());
        assert_eq!(pooler.default_size(), 512);

        pool.put(Vec::with_capacity(2048));
        let buf = pooler.get();
        assert_eq!(buf.capacity(), 2048);

        let stats = pooler.stats();
        assert_eq!(stats.bins[2].lookahead_hits, 1);
        assert_eq!(stats.bins[0].lookahead_misses, 1);
        assert_eq!(stats.get_hit_rate(), 1.0);
    }

    #[test]
    fn test_lease_releases_through_histogram() {
        let pool = Arc::new(BucketPool::pow2(512, 4096).unwrap());
        // no decay, so the single put stays visible in the histogram
        let config = PoolerConfig::default().with_decay(1.0);
        let pooler = BucketPooler::new(pool, config).unwrap();

        {
            let mut lease = pooler.lease_grown(3000);
            lease.resize(3000, 7);
        }

        let stats = pooler.stats();
        assert_eq!(stats.total_puts(), 1);
        assert_eq!(stats.default_size, 4096);
        assert_eq!(stats.pool.bucket(4096).unwrap().available, 1);

        let lease = pooler.lease();
        assert_eq!(lease.capacity(), 4096);
        assert!(lease.is_empty());
    }

    #[test]
    fn test_stats_serialize() {
        let pooler = BucketPooler::with_defaults(linear_pool());
        pooler.put(pooler.get_filled(1000));

        let stats = pooler.stats();
        let json = serde_json::to_string(&stats).unwrap();
        let back: PoolerStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
        assert_eq!(back.bins.len(), 8);
        assert!(back.summary().contains("default_size: 1024"));
    }
}
