//! Single free-list pool with no sizing logic

use serde::{Deserialize, Serialize};

use crate::{
    config::DEFAULT_FREE_LIST_CAPACITY,
    free_list::FreeList,
    grow::grow_min,
    traits::{Pooler, SizedPooler},
};

/// Snapshot of a [`SyncPool`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncPoolStats {
    pub available: usize,
    pub drops: u64,
}

/// Plain reuse of whatever was released last.
///
/// Suitable for similarly sized buffers; with mixed sizes the pooled
/// buffers trend toward the largest, wasting memory.
#[derive(Debug)]
pub struct SyncPool {
    free: FreeList,
}

impl SyncPool {
    /// Create a pool retaining up to the default number of idle buffers
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FREE_LIST_CAPACITY)
    }

    /// Create a pool retaining up to `capacity` idle buffers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            free: FreeList::new(capacity),
        }
    }

    /// Idle buffers waiting for reuse
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Releases dropped because the pool was full
    pub fn drops(&self) -> u64 {
        self.free.drops()
    }

    pub fn stats(&self) -> SyncPoolStats {
        SyncPoolStats {
            available: self.available(),
            drops: self.drops(),
        }
    }
}

impl Default for SyncPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SizedPooler for SyncPool {
    fn get_grown(&self, min_capacity: usize) -> Vec<u8> {
        let mut buf = self.get();
        grow_min(&mut buf, min_capacity);
        buf
    }

    fn get_filled(&self, len: usize) -> Vec<u8> {
        let mut buf = self.get_grown(len);
        buf.resize(len, 0);
        buf
    }

    fn put(&self, mut buf: Vec<u8>) {
        buf.clear();
        self.free.push(buf);
    }
}

impl Pooler for SyncPool {
    fn get(&self) -> Vec<u8> {
        self.free.pop().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_get() {
        let pool = SyncPool::new();
        let buf = pool.get();
        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn test_reuse_keeps_capacity() {
        let pool = SyncPool::new();
        let mut buf = pool.get_grown(100);
        buf.extend_from_slice(b"hello");
        let capacity = buf.capacity();
        pool.put(buf);
        assert_eq!(pool.available(), 1);

        let buf = pool.get_filled(50);
        assert_eq!(buf.len(), 50);
        assert_eq!(buf.capacity(), capacity);
    }

    #[test]
    fn test_bounded() {
        let pool = SyncPool::with_capacity(1);
        pool.put(Vec::new());
        pool.put(Vec::new());
        assert_eq!(pool.available(), 1);
        assert_eq!(
            pool.stats(),
            SyncPoolStats {
                available: 1,
                drops: 1
            }
        );
    }
}
