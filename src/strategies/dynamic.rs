//! Self-calibrating pool keyed on call-size sampling

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};

use crate::{
    config::DEFAULT_FREE_LIST_CAPACITY,
    free_list::FreeList,
    grow::grow_min,
    traits::{Pooler, SizedPooler},
};

/// log2 of the smallest step (one cache line)
const MIN_BIT_SIZE: u32 = 6;
const STEPS: usize = 20;
const MIN_SIZE: usize = 1 << MIN_BIT_SIZE;
const CALIBRATE_CALLS_THRESHOLD: u64 = 42_000;
const MAX_PERCENTILE: f64 = 0.95;

/// Step for a released length: bit length of `(len - 1) >> 6`, clamped
/// to the last step.
#[inline]
fn step_index(len: usize) -> usize {
    let n = len.saturating_sub(1) >> MIN_BIT_SIZE;
    let bits = (usize::BITS - n.leading_zeros()) as usize;
    bits.min(STEPS - 1)
}

/// Snapshot of a [`DynamicPool`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicPoolStats {
    pub default_size: usize,
    /// 0 until the first calibration
    pub max_size: usize,
    pub calibrations: u64,
    pub available: usize,
    pub drops: u64,
}

/// Continually tunes its allocation size and maximum retained size from
/// the lengths of released buffers.
///
/// Every put is counted into one of 20 power-of-two steps starting at
/// 64 bytes. Once a step passes 42 000 calls the pool recalibrates:
/// the most frequent step becomes the allocation size and the largest
/// step within the 95th percentile of calls becomes the retention limit.
#[derive(Debug)]
pub struct DynamicPool {
    calls: [AtomicU64; STEPS],
    calibrating: AtomicBool,
    default_size: AtomicUsize,
    max_size: AtomicUsize,
    calibrations: AtomicU64,
    free: FreeList,
}

impl DynamicPool {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FREE_LIST_CAPACITY)
    }

    /// Create a pool retaining up to `capacity` idle buffers
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            calls: std::array::from_fn(|_| AtomicU64::new(0)),
            calibrating: AtomicBool::new(false),
            default_size: AtomicUsize::new(0),
            max_size: AtomicUsize::new(0),
            calibrations: AtomicU64::new(0),
            free: FreeList::new(capacity),
        }
    }

    /// Capacity of freshly allocated buffers
    pub fn default_size(&self) -> usize {
        self.default_size.load(Ordering::Relaxed)
    }

    /// Largest capacity retained on put; 0 means unlimited
    pub fn max_size(&self) -> usize {
        self.max_size.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> DynamicPoolStats {
        DynamicPoolStats {
            default_size: self.default_size(),
            max_size: self.max_size(),
            calibrations: self.calibrations.load(Ordering::Relaxed),
            available: self.free.len(),
            drops: self.free.drops(),
        }
    }

    /// Recompute default and maximum sizes from the step counters.
    ///
    /// Only one thread calibrates at a time; others return immediately.
    pub fn calibrate(&self) {
        if self
            .calibrating
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return;
        }

        let mut steps: Vec<(u64, usize)> = self
            .calls
            .iter()
            .enumerate()
            .map(|(i, calls)| (calls.swap(0, Ordering::AcqRel), MIN_SIZE << i))
            .collect();
        let total: u64 = steps.iter().map(|&(calls, _)| calls).sum();
        if total == 0 {
            // another thread calibrated in between
            self.calibrating.store(false, Ordering::Release);
            return;
        }
        steps.sort_by(|a, b| b.0.cmp(&a.0));

        let default_size = steps[0].1;
        let mut max_size = default_size;

        let max_sum = (total as f64 * MAX_PERCENTILE) as u64;
        let mut sum = 0;
        for &(calls, size) in &steps {
            if sum > max_sum {
                break;
            }
            sum += calls;
            max_size = max_size.max(size);
        }

        self.default_size.store(default_size, Ordering::Relaxed);
        self.max_size.store(max_size, Ordering::Relaxed);
        self.calibrations.fetch_add(1, Ordering::Relaxed);

        log::debug!(
            "calibrated dynamic pool over {} calls: default {} bytes, max {} bytes",
            total,
            default_size,
            max_size
        );

        self.calibrating.store(false, Ordering::Release);
    }
}

impl Default for DynamicPool {
    fn default() -> Self {
        Self::new()
    }
}

impl SizedPooler for DynamicPool {
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
        let index = step_index(buf.len());
        if self.calls[index].fetch_add(1, Ordering::Relaxed) + 1 > CALIBRATE_CALLS_THRESHOLD {
            self.calibrate();
        }

        let max_size = self.max_size();
        if max_size == 0 || buf.capacity() <= max_size {
            buf.clear();
            self.free.push(buf);
        }
    }
}

impl Pooler for DynamicPool {
    fn get(&self) -> Vec<u8> {
        self.free
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.default_size()))
    }
}
