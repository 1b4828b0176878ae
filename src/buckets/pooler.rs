//! Adaptive per-consumer front-end over a shared bucket pool

use std::sync::{
    atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use crate::{
    config::RAMP_POINTS,
    error::Result,
    traits::{Pooler, SizedPooler},
};

use super::{
    bins::{build_bins, busiest_bin, find_bin, HistogramBin},
    config::PoolerConfig,
    pool::BucketPool,
    stats::PoolerStats,
};

/// Adaptive pooler over a shared [`BucketPool`].
///
/// Every release is counted into a decaying histogram keyed by the length
/// the caller actually used. Every `choose_inc` releases the busiest bin
/// picks the default bucket that size-less [`get`](Pooler::get) draws from,
/// and all bins decay. The first cycle also recomputes after 1, 10 and 100
/// releases so a cold pooler settles quickly.
///
/// Histogram and default state are private to this pooler. Only the
/// bucket free-lists are shared with other poolers on the same pool.
#[derive(Debug)]
pub struct BucketPooler {
    pool: Arc<BucketPool>,
    config: PoolerConfig,
    bins: Box<[HistogramBin]>,
    default_index: AtomicUsize,
    /// Counts up from `-choose_inc`; a recomputation fires at zero
    puts: AtomicI64,
    warm: AtomicBool,
    recomputations: AtomicU64,
}

impl BucketPooler {
    /// Create a pooler over `pool`. Unset config fields take their defaults.
    pub fn new(pool: Arc<BucketPool>, config: PoolerConfig) -> Result<Self> {
        let config = config.normalized();
        config.validate()?;
        Ok(Self::from_valid(pool, config))
    }

    /// Create a pooler with the default configuration
    pub fn with_defaults(pool: Arc<BucketPool>) -> Self {
        Self::from_valid(pool, PoolerConfig::default().normalized())
    }

    fn from_valid(pool: Arc<BucketPool>, config: PoolerConfig) -> Self {
        let choose_inc = config.choose_inc;
        Self {
            bins: build_bins(&pool),
            pool,
            config,
            default_index: AtomicUsize::new(0),
            puts: AtomicI64::new(-choose_inc),
            warm: AtomicBool::new(false),
            recomputations: AtomicU64::new(0),
        }
    }

    /// The shared pool beneath this pooler
    pub fn pool(&self) -> &Arc<BucketPool> {
        &self.pool
    }

    /// Effective configuration
    pub fn config(&self) -> &PoolerConfig {
        &self.config
    }

    /// Index of the bucket size-less gets draw from
    pub fn default_index(&self) -> usize {
        self.default_index.load(Ordering::Acquire)
    }

    /// Capacity handed out by size-less gets that allocate
    pub fn default_size(&self) -> usize {
        self.pool.buckets()[self.default_index()].size()
    }

    /// Buffer with zero length, preferably from the default bucket.
    ///
    /// Probes up to `bin_checks` buckets starting at the default without
    /// allocating. Only when all of them are empty is a buffer of the
    /// default size allocated.
    pub fn get(&self) -> Vec<u8> {
        let buckets = self.pool.buckets();
        let default = self.default_index();
        let end = default
            .saturating_add(self.config.bin_checks)
            .min(buckets.len());

        for index in default..end {
            if let Some(buf) = buckets[index].get_no_alloc(0) {
                if index == default {
                    self.bins[default].hits.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.bins[index].lookahead_hits.fetch_add(1, Ordering::Relaxed);
                    self.bins[default].lookahead_misses.fetch_add(1, Ordering::Relaxed);
                }
                return buf;
            }
        }

        self.bins[default].misses.fetch_add(1, Ordering::Relaxed);
        buckets[default].alloc()
    }

    /// Buffer with zero length and capacity of at least `min_capacity`
    pub fn get_grown(&self, min_capacity: usize) -> Vec<u8> {
        self.pool.get_grown(min_capacity)
    }

    /// Buffer with length `len`
    pub fn get_filled(&self, len: usize) -> Vec<u8> {
        self.pool.get_filled(len)
    }

    /// Release a buffer.
    ///
    /// The histogram is keyed by length (the demand the caller had), while
    /// the buffer itself goes to the bucket matching its capacity.
    pub fn put(&self, buf: Vec<u8>) {
        let Some(index) = self.pool.find_index(buf.capacity()) else {
            // oversized, the pool records and drops it
            self.pool.put(buf);
            return;
        };

        // len <= capacity <= largest bound, so a bin always matches
        let bin = find_bin(&self.bins, buf.len()).unwrap_or(self.bins.len() - 1);
        self.bins[bin].puts.fetch_add(1, Ordering::Relaxed);
        self.pool.put_at(index, buf);

        let count = self.puts.fetch_add(1, Ordering::AcqRel) + 1;
        if count == 0 {
            self.puts.fetch_sub(self.config.choose_inc, Ordering::AcqRel);
            self.warm.store(true, Ordering::Release);
            self.recompute();
        } else if count < 0 && !self.warm.load(Ordering::Acquire) {
            let seen = count + self.config.choose_inc;
            if RAMP_POINTS.contains(&seen) {
                self.recompute();
            }
        }
    }

    /// Pick the default bucket from the histogram, then decay every bin.
    pub fn recompute(&self) {
        self.choose_default();
        self.reduce_puts();
        self.recomputations.fetch_add(1, Ordering::Relaxed);
    }

    fn choose_default(&self) {
        let target = busiest_bin(&self.bins)
            .map(|bin| self.bins[bin].target)
            .unwrap_or(0);

        let previous = self.default_index.swap(target, Ordering::AcqRel);
        if previous != target {
            log::debug!(
                "default bucket moved from {} to {} bytes",
                self.pool.buckets()[previous].size(),
                self.pool.buckets()[target].size()
            );
        }
    }

    fn reduce_puts(&self) {
        for bin in self.bins.iter() {
            bin.decay(self.config.decay, self.config.max_pool_puts);
        }
    }

    /// Snapshot this pooler and its shared pool
    pub fn stats(&self) -> PoolerStats {
        let default_index = self.default_index();
        PoolerStats {
            pool: self.pool.stats(),
            bins: self.bins.iter().map(|b| b.snapshot(&self.pool)).collect(),
            default_index,
            default_size: self.pool.buckets()[default_index].size(),
            recomputations: self.recomputations.load(Ordering::Relaxed),
        }
    }
}

impl SizedPooler for BucketPooler {
    fn get_grown(&self, min_capacity: usize) -> Vec<u8> {
        BucketPooler::get_grown(self, min_capacity)
    }

    fn get_filled(&self, len: usize) -> Vec<u8> {
        BucketPooler::get_filled(self, len)
    }

    fn put(&self, buf: Vec<u8>) {
        BucketPooler::put(self, buf)
    }
}

impl Pooler for BucketPooler {
    fn get(&self) -> Vec<u8> {
        BucketPooler::get(self)
    }
}
