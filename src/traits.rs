//! Buffer acquisition contracts shared by every pool strategy

use crate::lease::Lease;

/// A pool that hands out buffers for a requested size.
///
/// Buffers move out of the pool on acquisition and back in on release, so a
/// released buffer cannot be touched again. Contents of reused buffers are
/// undefined, not zeroed.
pub trait SizedPooler: Send + Sync {
    /// Buffer with zero length and capacity of at least `min_capacity`
    fn get_grown(&self, min_capacity: usize) -> Vec<u8>;

    /// Buffer with length `len`
    fn get_filled(&self, len: usize) -> Vec<u8>;

    /// Return a buffer to the pool
    fn put(&self, buf: Vec<u8>);

    /// Return an optional buffer; `None` is a no-op
    fn put_opt(&self, buf: Option<Vec<u8>>) {
        if let Some(buf) = buf {
            self.put(buf);
        }
    }
}

/// A pool that also knows which size to hand out when none is requested.
pub trait Pooler: SizedPooler {
    /// Buffer with zero length and the pool's preferred capacity
    fn get(&self) -> Vec<u8>;
}

/// Scoped acquisition helpers for any pooler
pub trait PoolerExt: SizedPooler {
    /// Lease a buffer with zero length and capacity of at least `min_capacity`
    fn lease_grown(&self, min_capacity: usize) -> Lease<'_, Self> {
        Lease::new(self, self.get_grown(min_capacity))
    }

    /// Lease a buffer with length `len`
    fn lease_filled(&self, len: usize) -> Lease<'_, Self> {
        Lease::new(self, self.get_filled(len))
    }

    /// Lease a buffer of the pool's preferred capacity
    fn lease(&self) -> Lease<'_, Self>
    where
        Self: Pooler,
    {
        Lease::new(self, self.get())
    }
}

impl<P: SizedPooler + ?Sized> PoolerExt for P {}
