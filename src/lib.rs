//! # bytepool - Adaptive Reusable Byte Buffers
//!
//! bytepool hands out growable byte buffers sized to keep both
//! over-allocation and allocator churn low, and learns which size to hand
//! out from how buffers are actually used.
//!
//! ## Features
//!
//! - **Bucketed pool**: fixed-capacity buckets shared by many poolers
//! - **Adaptive default size**: decaying put histogram per pooler
//! - **Lookahead**: size-less gets reuse slightly larger idle buffers
//! - **Lock-free hot path**: bounded free-lists and atomic counters
//! - **Sibling strategies**: plain single-list and self-calibrating pools
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//! │ BucketPooler │  │ BucketPooler │  │ BucketPooler │   per-consumer histograms
//! └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!        └─────────────────┼─────────────────┘
//!                          ▼
//! ┌─────────────────────────────────────────────────────┐
//! │ BucketPool: [64] [128] [256] ... [max]  + overflow  │   shared, Arc
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use bytepool::{BucketPool, BucketPooler, PoolerExt};
//!
//! let pool = Arc::new(BucketPool::pow2(64, 64 * 1024)?);
//! let pooler = BucketPooler::with_defaults(pool);
//!
//! let mut buf = pooler.get();
//! buf.extend_from_slice(b"hello");
//! pooler.put(buf);
//!
//! {
//!     let mut lease = pooler.lease_grown(1000);
//!     lease.extend_from_slice(b"released on drop");
//! }
//! # Ok::<(), bytepool::PoolError>(())
//! ```

// Core modules
pub mod buckets;
pub mod error;
pub mod grow;
pub mod lease;
pub mod sizes;
pub mod strategies;
pub mod traits;

mod free_list;

// Main API re-exports
pub use buckets::{
    BinStats, BucketPool, BucketPoolConfig, BucketPoolStats, BucketPooler, BucketStats,
    PoolerConfig, PoolerConfigBuilder, PoolerStats, SizedPool,
};
pub use error::{PoolError, Result};
pub use grow::{grow_min, grow_min_max, sized};
pub use lease::Lease;
pub use sizes::{expo_sizes, linear_sizes, normalize_sizes, pow2_sizes, SizeSet};
pub use strategies::{DynamicPool, DynamicPoolStats, SyncPool, SyncPoolStats};
pub use traits::{Pooler, PoolerExt, SizedPooler};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration constants
pub mod config {
    /// Smallest bucket of the default size set
    pub const DEFAULT_MIN_SIZE: usize = 64;

    /// Largest bucket of the default size set (64KB)
    pub const DEFAULT_MAX_SIZE: usize = 64 * 1024;

    /// Idle buffers retained per free-list
    pub const DEFAULT_FREE_LIST_CAPACITY: usize = 1024;

    /// Puts between default-size recomputations
    pub const DEFAULT_CHOOSE_INC: i64 = 1000;

    /// Multiplier applied to histogram counts on recomputation
    pub const DEFAULT_DECAY: f64 = 0.5;

    /// Histogram ceiling as a multiple of the recompute interval
    pub const DEFAULT_MAX_PUTS_FACTOR: i64 = 100;

    /// Buckets probed by a size-less get, starting at the default
    pub const DEFAULT_BIN_CHECKS: usize = 4;

    /// Recent overflow sizes kept per direction
    pub const OVERFLOW_SAMPLES: usize = 11;

    /// Early recomputations during a pooler's first cycle, in puts seen
    pub const RAMP_POINTS: [i64; 3] = [1, 10, 100];
}
