//! Configuration builders controlling counting, model estimation, and vocabulary ingestion.

use crate::error::{NgramError, Result};
use serde::{Deserialize, Serialize};

/// Largest supported number of fractional digits in the written model.
pub const MAX_PRECISION: usize = 15;

/// Highest n-gram order accepted by the counter.
///
/// Every order gets its own table in every counting shard, and each n-gram of order `n` stores
/// `n` tokens, so orders beyond this bound only cost memory.
pub const MAX_ORDER: usize = 32;

/// Configuration for the n-gram counting pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CounterConfig {
    /// Highest n-gram order counted; orders `1..=max_order` are produced.
    pub max_order: usize,
    /// Lowercases every token before counting.
    pub lowercase: bool,
    /// Enables per-stage logging through the `log` facade.
    pub show_progress: bool,
}

impl CounterConfig {
    /// Returns a builder initialised with [`CounterConfig::default`].
    #[must_use]
    pub fn builder() -> CounterBuilder {
        CounterBuilder::default()
    }

    /// Validates the invariants required for counting.
    pub fn validate(&self) -> Result<()> {
        if self.max_order == 0 {
            return Err(NgramError::InvalidConfig(
                "max_order must be at least 1".into(),
            ));
        }
        if self.max_order > MAX_ORDER {
            return Err(NgramError::InvalidConfig(format!(
                "max_order must be at most {MAX_ORDER}, got {}",
                self.max_order
            )));
        }
        Ok(())
    }
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            max_order: 3,
            lowercase: false,
            show_progress: true,
        }
    }
}

/// Builder for [`CounterConfig`].
#[derive(Debug, Default, Clone)]
pub struct CounterBuilder {
    cfg: CounterConfig,
}

impl CounterBuilder {
    /// Creates a builder with [`CounterConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the highest n-gram order to count.
    #[must_use]
    pub fn max_order(mut self, value: usize) -> Self {
        self.cfg.max_order = value;
        self
    }

    /// Enables or disables lowercasing of tokens.
    #[must_use]
    pub fn lowercase(mut self, enabled: bool) -> Self {
        self.cfg.lowercase = enabled;
        self
    }

    /// Enables or disables stage logging.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`CounterConfig`].
    pub fn build(self) -> Result<CounterConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration for probability estimation and model output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    /// Additive smoothing constant; `0.0` yields the maximum-likelihood model.
    pub delta: f64,
    /// Number of fractional digits kept when formatting probabilities.
    pub precision: usize,
    /// Enables per-order logging through the `log` facade.
    pub show_progress: bool,
}

impl ModelConfig {
    /// Returns a builder initialised with [`ModelConfig::default`].
    #[must_use]
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    /// Validates the invariants required for estimation.
    pub fn validate(&self) -> Result<()> {
        if !self.delta.is_finite() || self.delta < 0.0 {
            return Err(NgramError::InvalidConfig(format!(
                "delta must be a finite, non-negative number (got {})",
                self.delta
            )));
        }
        if self.precision == 0 || self.precision > MAX_PRECISION {
            return Err(NgramError::InvalidConfig(format!(
                "precision ({}) must be between 1 and {MAX_PRECISION}",
                self.precision
            )));
        }
        Ok(())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            delta: 0.0,
            precision: 5,
            show_progress: true,
        }
    }
}

/// Builder for [`ModelConfig`].
#[derive(Debug, Default, Clone)]
pub struct ModelBuilder {
    cfg: ModelConfig,
}

impl ModelBuilder {
    /// Creates a builder with [`ModelConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the additive smoothing constant.
    #[must_use]
    pub fn delta(mut self, value: f64) -> Self {
        self.cfg.delta = value;
        self
    }

    /// Sets the number of fractional digits written for probabilities.
    #[must_use]
    pub fn precision(mut self, value: usize) -> Self {
        self.cfg.precision = value;
        self
    }

    /// Enables or disables per-order logging.
    #[must_use]
    pub fn show_progress(mut self, enabled: bool) -> Self {
        self.cfg.show_progress = enabled;
        self
    }

    /// Finalises the builder, returning a validated [`ModelConfig`].
    pub fn build(self) -> Result<ModelConfig> {
        self.cfg.validate()?;
        Ok(self.cfg)
    }
}

/// Configuration controlling how vocabulary source directories are traversed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestConfig {
    /// Enables recursive directory traversal.
    pub recursive: bool,
    /// Follows symlinks encountered during traversal.
    pub follow_symlinks: bool,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_symlinks: false,
        }
    }
}

impl IngestConfig {
    /// Returns a builder initialised with [`IngestConfig::default`].
    #[must_use]
    pub fn builder() -> IngestBuilder {
        IngestBuilder::default()
    }
}

/// Builder for [`IngestConfig`].
#[derive(Debug, Default, Clone)]
pub struct IngestBuilder {
    cfg: IngestConfig,
}

impl IngestBuilder {
    /// Creates a new builder with [`IngestConfig::default`] settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables recursive directory traversal.
    #[must_use]
    pub fn recursive(mut self, enabled: bool) -> Self {
        self.cfg.recursive = enabled;
        self
    }

    /// Enables or disables following of symlinks when traversing directories.
    #[must_use]
    pub fn follow_symlinks(mut self, enabled: bool) -> Self {
        self.cfg.follow_symlinks = enabled;
        self
    }

    /// Finalises the builder, returning the [`IngestConfig`].
    pub fn build(self) -> IngestConfig {
        self.cfg
    }
}
