//! Bucket pool and pooler configuration

use serde::{Deserialize, Serialize};

use crate::{
    config::{
        DEFAULT_BIN_CHECKS, DEFAULT_CHOOSE_INC, DEFAULT_DECAY, DEFAULT_FREE_LIST_CAPACITY,
        DEFAULT_MAX_PUTS_FACTOR,
    },
    error::{PoolError, Result},
    sizes::SizeSet,
};

/// Configuration for a shared bucket pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketPoolConfig {
    /// Bucket sizes
    pub sizes: SizeSet,
    /// Maximum idle buffers retained per bucket; 0 selects the default
    pub free_list_capacity: usize,
}

impl Default for BucketPoolConfig {
    fn default() -> Self {
        Self {
            sizes: SizeSet::default(),
            free_list_capacity: DEFAULT_FREE_LIST_CAPACITY,
        }
    }
}

impl BucketPoolConfig {
    /// Create a configuration for the given sizes
    pub fn new(sizes: impl Into<SizeSet>) -> Self {
        Self {
            sizes: sizes.into(),
            ..Default::default()
        }
    }

    /// Set the per-bucket free-list capacity
    pub fn with_free_list_capacity(mut self, capacity: usize) -> Self {
        self.free_list_capacity = capacity;
        self
    }

    /// Free-list capacity with the default applied
    pub fn effective_free_list_capacity(&self) -> usize {
        if self.free_list_capacity == 0 {
            DEFAULT_FREE_LIST_CAPACITY
        } else {
            self.free_list_capacity
        }
    }

    /// Validate the configuration, returning the resolved sizes
    pub fn validate(&self) -> Result<Vec<usize>> {
        self.sizes.resolve()
    }
}

impl From<SizeSet> for BucketPoolConfig {
    fn from(sizes: SizeSet) -> Self {
        Self::new(sizes)
    }
}

/// Tuning knobs for a [`BucketPooler`](super::BucketPooler).
///
/// Zero or negative values mean "use the default" and are replaced by
/// [`PoolerConfig::normalized`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolerConfig {
    /// Puts between default-bucket recomputations
    pub choose_inc: i64,
    /// Multiplier applied to every bin counter after a recomputation, in (0, 1]
    pub decay: f64,
    /// Ceiling for a decayed bin counter; 0 means `choose_inc * 100`
    pub max_pool_puts: i64,
    /// Buckets probed by a size-less get, starting at the default; 1 disables lookahead
    pub bin_checks: usize,
}

impl Default for PoolerConfig {
    fn default() -> Self {
        Self {
            choose_inc: DEFAULT_CHOOSE_INC,
            decay: DEFAULT_DECAY,
            // resolved from choose_inc by normalized()
            max_pool_puts: 0,
            bin_checks: DEFAULT_BIN_CHECKS,
        }
    }
}

impl PoolerConfig {
    /// Create the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set puts between recomputations
    pub fn with_choose_inc(mut self, choose_inc: i64) -> Self {
        self.choose_inc = choose_inc;
        self
    }

    /// Set the decay multiplier
    pub fn with_decay(mut self, decay: f64) -> Self {
        self.decay = decay;
        self
    }

    /// Set the decayed counter ceiling
    pub fn with_max_pool_puts(mut self, max_pool_puts: i64) -> Self {
        self.max_pool_puts = max_pool_puts;
        self
    }

    /// Set the lookahead width
    pub fn with_bin_checks(mut self, bin_checks: usize) -> Self {
        self.bin_checks = bin_checks;
        self
    }

    /// Replace unset fields with their defaults. `max_pool_puts` defaults
    /// relative to the (normalized) `choose_inc`.
    pub fn normalized(mut self) -> Self {
        if self.choose_inc <= 0 {
            self.choose_inc = DEFAULT_CHOOSE_INC;
        }
        if self.decay <= 0.0 {
            self.decay = DEFAULT_DECAY;
        }
        if self.max_pool_puts <= 0 {
            self.max_pool_puts = self.choose_inc.saturating_mul(DEFAULT_MAX_PUTS_FACTOR);
        }
        if self.bin_checks == 0 {
            self.bin_checks = DEFAULT_BIN_CHECKS;
        }
        self
    }

    /// Validate a normalized configuration
    pub fn validate(&self) -> Result<()> {
        if self.choose_inc <= 0 {
            return Err(PoolError::invalid_parameter(
                "choose_inc",
                "choose_inc must be positive",
            ));
        }

        if !(self.decay > 0.0 && self.decay <= 1.0) {
            return Err(PoolError::invalid_parameter(
                "decay",
                format!("decay must be in (0, 1], got {}", self.decay),
            ));
        }

        if self.max_pool_puts <= 0 {
            return Err(PoolError::invalid_parameter(
                "max_pool_puts",
                "max_pool_puts must be positive",
            ));
        }

        if self.bin_checks == 0 {
            return Err(PoolError::invalid_parameter(
                "bin_checks",
                "bin_checks must be at least 1",
            ));
        }

        Ok(())
    }
}

/// Builder pattern for pooler configuration
#[derive(Debug)]
pub struct PoolerConfigBuilder {
    config: PoolerConfig,
}

impl Default for PoolerConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PoolerConfigBuilder {
    /// Create a new builder with every field unset
    pub fn new() -> Self {
        Self {
            config: PoolerConfig {
                choose_inc: 0,
                decay: 0.0,
                max_pool_puts: 0,
                bin_checks: 0,
            },
        }
    }

    /// Set puts between recomputations
    pub fn choose_inc(mut self, choose_inc: i64) -> Self {
        self.config.choose_inc = choose_inc;
        self
    }

    /// Set the decay multiplier
    pub fn decay(mut self, decay: f64) -> Self {
        self.config.decay = decay;
        self
    }

    /// Set the decayed counter ceiling
    pub fn max_pool_puts(mut self, max_pool_puts: i64) -> Self {
        self.config.max_pool_puts = max_pool_puts;
        self
    }

    /// Set the lookahead width
    pub fn bin_checks(mut self, bin_checks: usize) -> Self {
        self.config.bin_checks = bin_checks;
        self
    }

    /// Disable lookahead
    pub fn no_lookahead(self) -> Self {
        self.bin_checks(1)
    }

    /// Build the configuration, applying defaults to unset fields
    pub fn build(self) -> Result<PoolerConfig> {
        let config = self.config.normalized();
        config.validate()?;
        Ok(config)
    }
}
