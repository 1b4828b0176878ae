//! Concurrent stress tests for high-contention scenarios
//! Many threads and poolers hammering one shared bucket pool

use std::{
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Barrier,
    },
    thread,
};

use bytepool::{BucketPool, BucketPooler, DynamicPool, Pooler, PoolerConfig, SizedPooler};

#[cfg(test)]
mod concurrent_stress_tests {
    use super::*;

    /// Test: one pool, one pooler per thread, mixed gets and puts
    #[test]
    fn stress_shared_pool_many_poolers() {
        let _ = env_logger::builder().is_test(true).try_init();
        let pool = Arc::new(BucketPool::pow2(64, 8192).unwrap());

        let thread_count = 8;
        let operations_per_thread = 2000;
        let barrier = Arc::new(Barrier::new(thread_count));
        let served = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for thread_id in 0..thread_count {
            let pool = pool.clone();
            let barrier = barrier.clone();
            let served = served.clone();

            handles.push(thread::spawn(move || {
                let config = PoolerConfig::default().with_choose_inc(50);
                let pooler = BucketPooler::new(pool, config).unwrap();
                barrier.wait();

                for i in 0..operations_per_thread {
                    let len = (thread_id * 997 + i * 31) % 10_000;
                    let mut buf = pooler.get_filled(len);
                    assert_eq!(buf.len(), len);
                    buf.fill(thread_id as u8);
                    pooler.put(buf);

                    let buf = pooler.get();
                    assert!(buf.is_empty());
                    assert!(buf.capacity() >= 64);
                    pooler.put(buf);

                    served.fetch_add(1, Ordering::Relaxed);
                }
                pooler.stats()
            }));
        }

        let mut recomputations = 0;
        for handle in handles {
            let stats = handle.join().unwrap();
            assert!(stats.default_size <= 8192);
            recomputations += stats.recomputations;
        }

        assert_eq!(served.load(Ordering::Relaxed), thread_count * operations_per_thread);
        assert!(recomputations > 0);

        let stats = pool.stats();
        assert!(stats.overs > 0);
        assert!(stats.get_overs.len() <= 11);
        assert!(stats.put_overs.len() <= 11);
        assert!(stats.hits > 0);
    }

    /// Test: stats snapshots while other threads overflow the pool
    #[test]
    fn stress_stats_during_overflow() {
        let pool = Arc::new(BucketPool::pow2(2, 9).unwrap());
        let thread_count = 4;
        let barrier = Arc::new(Barrier::new(thread_count + 1));

        let mut handles = Vec::new();
        for _ in 0..thread_count {
            let pool = pool.clone();
            let barrier = barrier.clone();
            handles.push(thread::spawn(move || {
                barrier.wait();
                for _ in 0..100 {
                    for j in 0..12 {
                        let mut buf = pool.get_filled(j);
                        if j == 11 {
                            buf.extend_from_slice(&[1, 2, 3]);
                        }
                        pool.put(buf);
                    }
                }
            }));
        }

        barrier.wait();
        for _ in 0..100 {
            let stats = pool.stats();
            assert!(stats.get_overs.len() <= 11);
        }
        for handle in handles {
            handle.join().unwrap();
        }

        // samples may be skipped under contention, the counter is not
        let stats = pool.stats();
        assert_eq!(stats.overs, (thread_count * 100 * 4) as u64);
    }

    /// Test: concurrent puts and explicit recomputes never exceed the ceiling
    #[test]
    fn stress_decay_under_contention() {
        let pool = Arc::new(BucketPool::pow2(64, 1024).unwrap());
        let config = PoolerConfig::default()
            .with_choose_inc(10)
            .with_max_pool_puts(40);
        let pooler = Arc::new(BucketPooler::new(pool, config).unwrap());
        let barrier = Arc::new(Barrier::new(4));

        let mut handles = Vec::new();
        for t in 0..4 {
            let pooler = pooler.clone();
            let barrier = barrier.clone();
            handles.push(thread::spawn(move || {
                barrier.wait();
                for i in 0..5000 {
                    if t == 0 && i % 100 == 0 {
                        pooler.recompute();
                    }
                    pooler.put(pooler.get_filled(100));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        pooler.recompute();
        for bin in pooler.stats().bins {
            assert!(bin.puts <= 40);
            assert!(bin.puts >= 0);
        }
        // 100 bytes lands in the first bin, whose bound (205) maps to 256
        assert_eq!(pooler.default_size(), 256);
    }

    /// Test: decay racing with puts never loses an increment
    #[test]
    fn stress_decay_keeps_concurrent_increments() {
        let pool = Arc::new(BucketPool::pow2(64, 1024).unwrap());
        // decay 1.0 keeps every count, so any overwrite shows up as a shortfall
        let config = PoolerConfig::default()
            .with_choose_inc(1_000_000)
            .with_decay(1.0)
            .with_max_pool_puts(i64::MAX);
        let pooler = Arc::new(BucketPooler::new(pool, config).unwrap());

        let writer_count = 4;
        let puts_per_writer = 20_000;
        let barrier = Arc::new(Barrier::new(writer_count + 1));
        let done = Arc::new(AtomicBool::new(false));

        let recomputer = {
            let pooler = pooler.clone();
            let barrier = barrier.clone();
            let done = done.clone();
            thread::spawn(move || {
                barrier.wait();
                let mut rounds = 0u64;
                while !done.load(Ordering::Acquire) {
                    pooler.recompute();
                    rounds += 1;
                }
                rounds
            })
        };

        let mut handles = Vec::new();
        for t in 0..writer_count {
            let pooler = pooler.clone();
            let barrier = barrier.clone();
            handles.push(thread::spawn(move || {
                barrier.wait();
                for i in 0..puts_per_writer {
                    // spread over several bins
                    let len = (t * 211 + i * 97) % 1024;
                    pooler.put(pooler.get_filled(len));
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        done.store(true, Ordering::Release);
        let rounds = recomputer.join().unwrap();

        assert!(rounds > 0);
        assert_eq!(
            pooler.stats().total_puts(),
            (writer_count * puts_per_writer) as i64
        );
    }

    /// Test: dynamic pool calibrates once per threshold crossing under load
    #[test]
    fn stress_dynamic_pool() {
        let pool = Arc::new(DynamicPool::new());
        let thread_count = 4;
        let barrier = Arc::new(Barrier::new(thread_count));

        let mut handles = Vec::new();
        for _ in 0..thread_count {
            let pool = pool.clone();
            let barrier = barrier.clone();
            handles.push(thread::spawn(move || {
                barrier.wait();
                for _ in 0..20_000 {
                    let buf = pool.get_filled(200);
                    pool.put(buf);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let stats = pool.stats();
        assert!(stats.calibrations >= 1);
        assert_eq!(stats.default_size, 256);
        assert_eq!(stats.max_size, 256);
        assert!(pool.get().capacity() >= 200);
    }
}
