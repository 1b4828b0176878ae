//! Single fixed-capacity bucket

use std::sync::atomic::{AtomicU64, Ordering};

use crate::{free_list::FreeList, grow::grow_min_max};

use super::stats::BucketStats;

/// A bucket of buffers whose capacity never exceeds `size`.
///
/// Hit and miss counters move exactly once per `get`/`get_no_alloc` call.
#[derive(Debug)]
pub struct SizedPool {
    size: usize,
    free: FreeList,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SizedPool {
    pub(crate) fn new(size: usize, free_list_capacity: usize) -> Self {
        Self {
            size,
            free: FreeList::new(free_list_capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Bucket capacity in bytes
    pub fn size(&self) -> usize {
        self.size
    }

    /// Reuse or allocate a buffer with capacity in `[min_len, size]`.
    ///
    /// # Panics
    ///
    /// Panics if `min_len` exceeds the bucket size.
    pub fn get(&self, min_len: usize) -> Vec<u8> {
        match self.get_no_alloc(min_len) {
            Some(buf) => buf,
            None => self.alloc(),
        }
    }

    /// Like [`get`](Self::get) but returns `None` instead of allocating.
    ///
    /// # Panics
    ///
    /// Panics if `min_len` exceeds the bucket size.
    pub fn get_no_alloc(&self, min_len: usize) -> Option<Vec<u8>> {
        assert!(
            min_len <= self.size,
            "requested length {} exceeds bucket size {}",
            min_len,
            self.size
        );

        match self.free.pop() {
            Some(mut buf) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                if buf.capacity() < min_len {
                    grow_min_max(&mut buf, min_len, self.size);
                }
                Some(buf)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Fresh buffer of exactly the bucket size; touches no counter.
    pub(crate) fn alloc(&self) -> Vec<u8> {
        Vec::with_capacity(self.size)
    }

    /// Clear `buf` and make it available for reuse.
    ///
    /// # Panics
    ///
    /// Panics if the buffer's capacity exceeds the bucket size.
    pub fn put(&self, mut buf: Vec<u8>) {
        assert!(
            buf.capacity() <= self.size,
            "buffer capacity {} exceeds bucket size {}",
            buf.capacity(),
            self.size
        );
        buf.clear();
        self.free.push(buf);
    }

    /// Free-list hits so far
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Free-list misses so far
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Idle buffers waiting for reuse
    pub fn available(&self) -> usize {
        self.free.len()
    }

    pub(crate) fn snapshot(&self) -> BucketStats {
        BucketStats {
            size: self.size,
            hits: self.hits(),
            misses: self.misses(),
            drops: self.free.drops(),
            available: self.available(),
        }
    }
}
