//! Alternative pooling strategies sharing the [`Pooler`](crate::Pooler) contract

pub mod dynamic;
pub mod sync_pool;

pub use dynamic::{DynamicPool, DynamicPoolStats};
pub use sync_pool::{SyncPool, SyncPoolStats};
