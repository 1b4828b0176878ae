//! Scoped buffer leases that release on drop

use std::{
    fmt,
    mem::ManuallyDrop,
    ops::{Deref, DerefMut},
};

use crate::traits::SizedPooler;

/// A buffer borrowed from a pool for the lifetime of the guard.
///
/// Dropping the lease puts the buffer back into the pool it came from.
/// [`Lease::detach`] keeps the buffer instead.
pub struct Lease<'a, P: SizedPooler + ?Sized> {
    pool: &'a P,
    buf: Vec<u8>,
}

impl<'a, P: SizedPooler + ?Sized> Lease<'a, P> {
    /// Wrap a buffer acquired from `pool`
    pub fn new(pool: &'a P, buf: Vec<u8>) -> Self {
        Self { pool, buf }
    }

    /// Take the buffer out without returning it to the pool
    pub fn detach(self) -> Vec<u8> {
        let mut this = ManuallyDrop::new(self);
        std::mem::take(&mut this.buf)
    }

    /// Return the buffer now
    pub fn release(self) {
        drop(self);
    }

    /// The pool this lease returns to
    pub fn pool(&self) -> &'a P {
        self.pool
    }
}

impl<P: SizedPooler + ?Sized> Deref for Lease<'_, P> {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl<P: SizedPooler + ?Sized> DerefMut for Lease<'_, P> {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl<P: SizedPooler + ?Sized> Drop for Lease<'_, P> {
    fn drop(&mut self) {
        self.pool.put(std::mem::take(&mut self.buf));
    }
}

impl<P: SizedPooler + ?Sized> fmt::Debug for Lease<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lease")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}
