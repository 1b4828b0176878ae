//! Bucket size-set generators
//!
//! Every generator returns an ascending, deduplicated list whose first element
//! is exactly the requested minimum and whose last element is exactly the
//! requested maximum.

use serde::{Deserialize, Serialize};

use crate::error::{PoolError, Result};

/// Sizes that double from `min_size` and end at `max_size`.
///
/// `min_size` must be >= 1 and `max_size` > `min_size`.
pub fn pow2_sizes(min_size: usize, max_size: usize) -> Result<Vec<usize>> {
    check_min(min_size, 1)?;
    check_bounds(min_size, max_size)?;

    let mut sizes = Vec::new();
    let mut size = min_size;
    while size < max_size {
        sizes.push(size);
        size = match size.checked_mul(2) {
            Some(next) => next,
            None => break,
        };
    }
    sizes.push(max_size);
    Ok(sizes)
}

/// Sizes spread evenly between `min_size` and `max_size` over `num_buckets`.
///
/// Values are rounded half-to-even and repeats collapse, so narrow ranges
/// yield fewer buckets than requested. `min_size` may be 0 here.
pub fn linear_sizes(min_size: usize, max_size: usize, num_buckets: usize) -> Result<Vec<usize>> {
    check_bounds(min_size, max_size)?;
    check_buckets(num_buckets)?;

    let inc = (max_size - min_size) as f64 / (num_buckets - 1) as f64;
    let sizes = spread(min_size, max_size, num_buckets, |i| {
        min_size as f64 + i as f64 * inc
    });
    Ok(sizes)
}

/// Sizes spread geometrically between `min_size` and `max_size`.
///
/// Size at `i` is `min * r^i` with `r = (max / min)^(1 / (num_buckets - 1))`,
/// rounded half-to-even and deduplicated. `min_size` must be >= 1.
pub fn expo_sizes(min_size: usize, max_size: usize, num_buckets: usize) -> Result<Vec<usize>> {
    check_min(min_size, 1)?;
    check_bounds(min_size, max_size)?;
    check_buckets(num_buckets)?;

    let ratio = (max_size as f64 / min_size as f64).powf(1.0 / (num_buckets - 1) as f64);
    let sizes = spread(min_size, max_size, num_buckets, |i| {
        min_size as f64 * ratio.powi(i as i32)
    });
    Ok(sizes)
}

fn spread(
    min_size: usize,
    max_size: usize,
    num_buckets: usize,
    value_at: impl Fn(usize) -> f64,
) -> Vec<usize> {
    let last = num_buckets - 1;
    let mut sizes: Vec<usize> = (0..num_buckets)
        .map(|i| match i {
            0 => min_size,
            i if i == last => max_size,
            // clamp keeps float drift from breaking the ascending order
            i => (value_at(i).round_ties_even() as usize).clamp(min_size, max_size),
        })
        .collect();
    sizes.dedup();
    sizes
}

fn check_min(min_size: usize, floor: usize) -> Result<()> {
    if min_size < floor {
        return Err(PoolError::invalid_parameter(
            "min_size",
            format!("min_size < {}", floor),
        ));
    }
    Ok(())
}

fn check_bounds(min_size: usize, max_size: usize) -> Result<()> {
    if max_size <= min_size {
        return Err(PoolError::invalid_parameter(
            "max_size",
            "max_size <= min_size",
        ));
    }
    Ok(())
}

fn check_buckets(num_buckets: usize) -> Result<()> {
    if num_buckets < 2 {
        return Err(PoolError::invalid_parameter(
            "num_buckets",
            "num_buckets < 2",
        ));
    }
    Ok(())
}

/// Sorts and deduplicates explicit bucket sizes, rejecting empty sets and
/// zero sizes.
pub fn normalize_sizes(mut sizes: Vec<usize>) -> Result<Vec<usize>> {
    if sizes.is_empty() {
        return Err(PoolError::EmptySizes);
    }
    if sizes.contains(&0) {
        return Err(PoolError::invalid_size(0));
    }
    sizes.sort_unstable();
    sizes.dedup();
    Ok(sizes)
}

/// Declarative description of a bucket size set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeSet {
    /// Doubling sizes, see [`pow2_sizes`]
    Pow2 { min: usize, max: usize },
    /// Evenly spaced sizes, see [`linear_sizes`]
    Linear { min: usize, max: usize, buckets: usize },
    /// Geometrically spaced sizes, see [`expo_sizes`]
    Expo { min: usize, max: usize, buckets: usize },
    /// Caller supplied sizes, sorted and deduplicated on resolve
    Explicit { sizes: Vec<usize> },
}

impl SizeSet {
    /// Produce the normalized bucket sizes
    pub fn resolve(&self) -> Result<Vec<usize>> {
        let sizes = match self {
            Self::Pow2 { min, max } => pow2_sizes(*min, *max)?,
            Self::Linear { min, max, buckets } => linear_sizes(*min, *max, *buckets)?,
            Self::Expo { min, max, buckets } => expo_sizes(*min, *max, *buckets)?,
            Self::Explicit { sizes } => sizes.clone(),
        };
        normalize_sizes(sizes)
    }
}

impl Default for SizeSet {
    fn default() -> Self {
        Self::Pow2 {
            min: crate::config::DEFAULT_MIN_SIZE,
            max: crate::config::DEFAULT_MAX_SIZE,
        }
    }
}

impl From<Vec<usize>> for SizeSet {
    fn from(sizes: Vec<usize>) -> Self {
        Self::Explicit { sizes }
    }
}
