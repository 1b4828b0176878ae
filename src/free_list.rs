//! Bounded lock-free free-list of reusable buffers

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_queue::ArrayQueue;

/// Lock-free stack of idle buffers, bounded so that a burst of releases
/// cannot pin memory forever.
///
/// A push onto a full list drops the buffer and counts it.
#[derive(Debug)]
pub(crate) struct FreeList {
    queue: ArrayQueue<Vec<u8>>,
    drops: AtomicU64,
}

impl FreeList {
    /// `capacity` must be non-zero; configs normalize zero before this point.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            queue: ArrayQueue::new(capacity.max(1)),
            drops: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn pop(&self) -> Option<Vec<u8>> {
        self.queue.pop()
    }

    /// Returns false when the list was full and the buffer was dropped.
    #[inline]
    pub(crate) fn push(&self, buf: Vec<u8>) -> bool {
        match self.queue.push(buf) {
            Ok(()) => true,
            Err(dropped) => {
                self.drops.fetch_add(1, Ordering::Relaxed);
                log::trace!(
                    "free-list full ({} buffers), dropping buffer of capacity {}",
                    self.queue.capacity(),
                    dropped.capacity()
                );
                false
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn drops(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }
}
