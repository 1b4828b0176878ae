//! Decaying put-frequency histogram used to pick a pooler's default bucket

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use super::{pool::BucketPool, stats::BinStats};

/// One histogram bin. Bin `i` shares its position with bucket `i`.
///
/// Released lengths are classified against `bound`, which is spaced
/// linearly from 0 to the largest bucket size so that wide buckets do not
/// collect more puts just for covering more sizes. Get-side counters
/// describe the bucket at the same position as seen by the owning pooler.
#[derive(Debug)]
pub(crate) struct HistogramBin {
    pub(crate) bound: usize,
    /// Bucket made default when this bin has the most puts
    pub(crate) target: usize,
    pub(crate) puts: AtomicI64,
    pub(crate) hits: AtomicU64,
    pub(crate) misses: AtomicU64,
    pub(crate) lookahead_hits: AtomicU64,
    pub(crate) lookahead_misses: AtomicU64,
}

impl HistogramBin {
    fn new(bound: usize, target: usize) -> Self {
        Self {
            bound,
            target,
            puts: AtomicI64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            lookahead_hits: AtomicU64::new(0),
            lookahead_misses: AtomicU64::new(0),
        }
    }

    /// Multiply the put counter by `decay`, rounding half-to-even, and cap
    /// it at `max_puts`. Retries on contention so a concurrent increment is
    /// never overwritten by a value computed from a stale read.
    pub(crate) fn decay(&self, decay: f64, max_puts: i64) {
        let mut current = self.puts.load(Ordering::Acquire);
        loop {
            let decayed = ((current as f64 * decay).round_ties_even() as i64).min(max_puts);
            match self.puts.compare_exchange_weak(
                current,
                decayed,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return,
                Err(actual) => {
                    current = actual;
                    std::hint::spin_loop();
                }
            }
        }
    }

    pub(crate) fn snapshot(&self, pool: &BucketPool) -> BinStats {
        BinStats {
            bound: self.bound,
            target_size: pool.buckets()[self.target].size(),
            puts: self.puts.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            lookahead_hits: self.lookahead_hits.load(Ordering::Relaxed),
            lookahead_misses: self.lookahead_misses.load(Ordering::Relaxed),
        }
    }
}

/// Build one bin per bucket with bounds `round(max * i / n)` for `i` in
/// `1..=n`, the last pinned to the largest bucket size.
pub(crate) fn build_bins(pool: &BucketPool) -> Box<[HistogramBin]> {
    let count = pool.len();
    let max_size = pool.max_size();

    (1..=count)
        .map(|i| {
            let bound = if i == count {
                max_size
            } else {
                (max_size as f64 * i as f64 / count as f64).round_ties_even() as usize
            };
            // bound never exceeds the largest bucket, so a target always exists
            let target = pool.find_index(bound).unwrap_or(count - 1);
            HistogramBin::new(bound, target)
        })
        .collect()
}

/// Index of the first bin whose bound holds `len`
#[inline]
pub(crate) fn find_bin(bins: &[HistogramBin], len: usize) -> Option<usize> {
    let index = bins.partition_point(|b| b.bound < len);
    (index < bins.len()).then_some(index)
}

/// Bin with the most puts; ties go to the lowest index
pub(crate) fn busiest_bin(bins: &[HistogramBin]) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (index, bin) in bins.iter().enumerate() {
        let puts = bin.puts.load(Ordering::Relaxed);
        if best.map_or(true, |(_, max)| puts > max) {
            best = Some((index, puts));
        }
    }
    best.map(|(index, _)| index)
}
