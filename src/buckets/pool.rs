//! Shared array of fixed-capacity buckets

use std::{
    collections::VecDeque,
    sync::atomic::{AtomicU64, Ordering},
};

use crate::{
    config::OVERFLOW_SAMPLES,
    error::Result,
    sizes::SizeSet,
    traits::SizedPooler,
};

use super::{
    config::BucketPoolConfig,
    sized::SizedPool,
    stats::BucketPoolStats,
};

/// Which side of the pool saw an oversized buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverflowPath {
    Get,
    Put,
}

/// Bounded recent history of oversized requests
#[derive(Debug, Default)]
struct OverflowSamples {
    get: VecDeque<usize>,
    put: VecDeque<usize>,
}

impl OverflowSamples {
    fn record(&mut self, path: OverflowPath, size: usize) {
        let samples = match path {
            OverflowPath::Get => &mut self.get,
            OverflowPath::Put => &mut self.put,
        };
        if samples.len() >= OVERFLOW_SAMPLES {
            samples.pop_front();
        }
        samples.push_back(size);
    }
}

/// Buckets of increasing size shared by any number of poolers.
///
/// Requests resolve to the smallest bucket that fits. Anything larger than
/// the largest bucket is allocated directly and counted as overflow.
#[derive(Debug)]
pub struct BucketPool {
    pools: Box<[SizedPool]>,
    overs: AtomicU64,
    // test-and-set lock; only guards the sample lists
    samples: spin::Mutex<OverflowSamples>,
}

impl BucketPool {
    /// Create a pool from a configuration
    pub fn new(config: BucketPoolConfig) -> Result<Self> {
        let sizes = config.validate()?;
        let capacity = config.effective_free_list_capacity();

        log::debug!(
            "creating bucket pool with {} buckets ({}..={} bytes), free-list capacity {}",
            sizes.len(),
            sizes[0],
            sizes[sizes.len() - 1],
            capacity
        );

        let pools = sizes
            .into_iter()
            .map(|size| SizedPool::new(size, capacity))
            .collect();

        Ok(Self {
            pools,
            overs: AtomicU64::new(0),
            samples: spin::Mutex::new(OverflowSamples::default()),
        })
    }

    /// Create a pool with the given sizes and default free-list capacity
    pub fn with_sizes(sizes: impl Into<SizeSet>) -> Result<Self> {
        Self::new(BucketPoolConfig::new(sizes))
    }

    /// Create a pool with power-of-two buckets from `min_size` to `max_size`
    pub fn pow2(min_size: usize, max_size: usize) -> Result<Self> {
        Self::with_sizes(SizeSet::Pow2 {
            min: min_size,
            max: max_size,
        })
    }

    /// Index of the smallest bucket that holds `size` bytes
    #[inline]
    pub fn find_index(&self, size: usize) -> Option<usize> {
        let index = self.pools.partition_point(|p| p.size() < size);
        (index < self.pools.len()).then_some(index)
    }

    /// Smallest bucket that holds `size` bytes
    pub fn find_pool(&self, size: usize) -> Option<&SizedPool> {
        self.find_index(size).map(|index| &self.pools[index])
    }

    /// All buckets, smallest first
    pub fn buckets(&self) -> &[SizedPool] {
        &self.pools
    }

    /// Bucket sizes, smallest first
    pub fn sizes(&self) -> Vec<usize> {
        self.pools.iter().map(SizedPool::size).collect()
    }

    /// Number of buckets
    pub fn len(&self) -> usize {
        self.pools.len()
    }

    /// Always false; a pool has at least one bucket
    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    /// Smallest bucket size
    pub fn min_size(&self) -> usize {
        self.pools[0].size()
    }

    /// Largest bucket size
    pub fn max_size(&self) -> usize {
        self.pools[self.pools.len() - 1].size()
    }

    /// Oversized requests and releases so far
    pub fn overs(&self) -> u64 {
        self.overs.load(Ordering::Relaxed)
    }

    /// Buffer with zero length and capacity in `[min_capacity, bucket size]`,
    /// or exactly `min_capacity` when no bucket is large enough
    pub fn get_grown(&self, min_capacity: usize) -> Vec<u8> {
        match self.find_pool(min_capacity) {
            Some(pool) => pool.get(min_capacity),
            None => {
                self.over(OverflowPath::Get, min_capacity);
                Vec::with_capacity(min_capacity)
            }
        }
    }

    /// Buffer with length `len`. Contents are unspecified.
    pub fn get_filled(&self, len: usize) -> Vec<u8> {
        let mut buf = self.get_grown(len);
        buf.resize(len, 0);
        buf
    }

    /// Release a buffer into the bucket matching its capacity. Buffers larger
    /// than every bucket are dropped and counted as overflow.
    pub fn put(&self, buf: Vec<u8>) {
        match self.find_index(buf.capacity()) {
            Some(index) => self.pools[index].put(buf),
            None => self.over(OverflowPath::Put, buf.capacity()),
        }
    }

    /// Release into a bucket already resolved by the caller
    pub(crate) fn put_at(&self, index: usize, buf: Vec<u8>) {
        self.pools[index].put(buf);
    }

    /// Snapshot the pool's counters
    pub fn stats(&self) -> BucketPoolStats {
        let (get_overs, put_overs) = {
            let samples = self.samples.lock();
            (
                samples.get.iter().copied().collect(),
                samples.put.iter().copied().collect(),
            )
        };

        let buckets: Vec<_> = self.pools.iter().map(SizedPool::snapshot).collect();
        BucketPoolStats {
            min_size: self.min_size(),
            max_size: self.max_size(),
            sizes: self.pools.len(),
            hits: buckets.iter().map(|b| b.hits).sum(),
            misses: buckets.iter().map(|b| b.misses).sum(),
            overs: self.overs(),
            get_overs,
            put_overs,
            buckets,
        }
    }

    fn over(&self, path: OverflowPath, size: usize) {
        self.overs.fetch_add(1, Ordering::Relaxed);

        // already held: skip the sample rather than wait
        if let Some(mut samples) = self.samples.try_lock() {
            samples.record(path, size);
        }
        log::trace!("{:?} of {} bytes exceeds largest bucket {}", path, size, self.max_size());
    }
}

impl SizedPooler for BucketPool {
    fn get_grown(&self, min_capacity: usize) -> Vec<u8> {
        BucketPool::get_grown(self, min_capacity)
    }

    fn get_filled(&self, len: usize) -> Vec<u8> {
        BucketPool::get_filled(self, len)
    }

    fn put(&self, buf: Vec<u8>) {
        BucketPool::put(self, buf)
    }
}
