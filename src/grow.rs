//! Capacity growth helpers for pooled buffers
//!
//! All helpers leave the buffer with length 0. Growth goes through
//! `Vec::reserve`, so the allocator may hand back more than requested.

/// Ensures capacity for `min` total bytes. Length is reset to 0.
pub fn grow_min(buf: &mut Vec<u8>, min: usize) {
    buf.clear();
    if buf.capacity() < min {
        buf.reserve(min);
    }
}

/// Ensures capacity for `min` total bytes, then clips capacity to exactly
/// `max` if it ended up larger. Length is reset to 0.
///
/// Buckets use this so a pooled buffer never outgrows its bucket size.
pub fn grow_min_max(buf: &mut Vec<u8>, min: usize, max: usize) {
    grow_min(buf, min);
    if buf.capacity() > max {
        buf.shrink_to(max);
    }
}

/// Returns `buf` cleared when it already holds `size` bytes, otherwise a
/// fresh buffer with capacity `size`. Contents are not preserved.
pub fn sized(mut buf: Vec<u8>, size: usize) -> Vec<u8> {
    if size <= buf.capacity() {
        buf.clear();
        return buf;
    }
    Vec::with_capacity(size)
}
