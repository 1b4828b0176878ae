//! Bucketed buffer pools with adaptive default-size selection
//!
//! A [`BucketPool`] owns an ordered array of fixed-capacity buckets and is
//! shared (behind an `Arc`) by any number of [`BucketPooler`]s. Each pooler
//! keeps its own decaying histogram of released lengths and uses it to pick
//! the bucket that size-less gets draw from.

mod bins;
pub mod config;
pub mod pool;
pub mod pooler;
pub mod sized;
pub mod stats;

// Re-export main types
pub use config::{BucketPoolConfig, PoolerConfig, PoolerConfigBuilder};
pub use pool::BucketPool;
pub use pooler::BucketPooler;
pub use sized::SizedPool;
pub use stats::{BinStats, BucketPoolStats, BucketStats, PoolerStats};
