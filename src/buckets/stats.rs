//! Point-in-time statistics for bucket pools and poolers
//!
//! Fields are loaded individually with relaxed atomics, so a snapshot taken
//! under concurrent traffic may mix values from slightly different instants.

use serde::{Deserialize, Serialize};

/// Counters for one bucket of a shared pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketStats {
    /// Bucket capacity in bytes
    pub size: usize,
    /// Gets served from the free-list
    pub hits: u64,
    /// Gets that found the free-list empty
    pub misses: u64,
    /// Puts dropped because the free-list was full
    pub drops: u64,
    /// Buffers currently idle in the free-list
    pub available: usize,
}

/// Snapshot of a shared bucket pool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketPoolStats {
    /// Per-bucket counters, smallest bucket first
    pub buckets: Vec<BucketStats>,
    /// Smallest bucket size
    pub min_size: usize,
    /// Largest bucket size
    pub max_size: usize,
    /// Number of buckets
    pub sizes: usize,
    /// Total hits across buckets
    pub hits: u64,
    /// Total misses across buckets
    pub misses: u64,
    /// Requests and releases larger than the largest bucket
    pub overs: u64,
    /// Most recent oversized get requests, oldest first
    pub get_overs: Vec<usize>,
    /// Most recent oversized releases (by capacity), oldest first
    pub put_overs: Vec<usize>,
}

impl BucketPoolStats {
    /// Fraction of gets served from a free-list (0.0 to 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }

    /// Counters for the bucket of exactly `size`
    pub fn bucket(&self, size: usize) -> Option<&BucketStats> {
        self.buckets.iter().find(|b| b.size == size)
    }

    /// Get a summary string of the statistics
    pub fn summary(&self) -> String {
        format!(
            "BucketPoolStats {{ buckets: {} ({}..={}), hits: {}, misses: {}, \
             overs: {}, hit_rate: {:.2}% }}",
            self.sizes,
            self.min_size,
            self.max_size,
            self.hits,
            self.misses,
            self.overs,
            self.hit_rate() * 100.0
        )
    }
}

/// Counters for one histogram bin of a pooler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinStats {
    /// Largest released length classified into this bin
    pub bound: usize,
    /// Bucket size chosen as default when this bin dominates
    pub target_size: usize,
    /// Decaying count of recent releases
    pub puts: i64,
    /// Size-less gets served directly from the bucket at this position
    pub hits: u64,
    /// Size-less gets that allocated at this position
    pub misses: u64,
    /// Size-less gets served here while scanning ahead of the default
    pub lookahead_hits: u64,
    /// Size-less gets that found this position empty as the default
    pub lookahead_misses: u64,
}

/// Snapshot of a pooler and the shared pool beneath it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoolerStats {
    /// Shared pool snapshot
    pub pool: BucketPoolStats,
    /// Histogram bins, one per bucket
    pub bins: Vec<BinStats>,
    /// Index of the current default bucket
    pub default_index: usize,
    /// Capacity handed out by size-less gets
    pub default_size: usize,
    /// Default-bucket recomputations so far
    pub recomputations: u64,
}

impl PoolerStats {
    /// Sum of decaying put counters
    pub fn total_puts(&self) -> i64 {
        self.bins.iter().map(|b| b.puts).sum()
    }

    /// Fraction of size-less gets served without allocating (0.0 to 1.0)
    pub fn get_hit_rate(&self) -> f64 {
        let served: u64 = self.bins.iter().map(|b| b.hits + b.lookahead_hits).sum();
        let missed: u64 = self.bins.iter().map(|b| b.misses).sum();
        if served + missed == 0 {
            return 0.0;
        }
        served as f64 / (served + missed) as f64
    }

    /// Get a summary string of the statistics
    pub fn summary(&self) -> String {
        format!(
            "PoolerStats {{ default_size: {}, recomputations: {}, recent_puts: {}, \
             get_hit_rate: {:.2}%, pool: {} }}",
            self.default_size,
            self.recomputations,
            self.total_puts(),
            self.get_hit_rate() * 100.0,
            self.pool.summary()
        )
    }
}
