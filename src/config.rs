//! Engine configuration.
//!
//! [`EngineConfig`] controls how reductions are split into partitions and
//! whether independent segments may be reduced on a thread pool. Neither
//! setting is observable in results; both only affect how work is scheduled.
use crate::error::{LimbKitError, Result};
use serde::{Deserialize, Serialize};

/// Default partition length, in elements.
///
/// 1024 elements * 8 bytes per limb = 8KB per limb array, which fits well in L1 cache.
pub const DEFAULT_PARTITION_LEN: usize = 1024;

/// Tuning knobs for the aggregator and the engine.
///
/// # Examples
///
/// ```rust
/// use limbkit::EngineConfig;
///
/// let config = EngineConfig::from_toml("partition_len = 16").unwrap();
/// assert_eq!(config.partition_len(), 16);
/// assert!(!config.parallel());
///
/// assert!(EngineConfig::from_toml("partition_len = 0").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    partition_len: usize,
    parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            partition_len: DEFAULT_PARTITION_LEN,
            parallel: false,
        }
    }
}

impl EngineConfig {
    /// Create a validated configuration.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::InvalidArgument`] if `partition_len` is 0
    pub fn new(partition_len: usize, parallel: bool) -> Result<Self> {
        let config = Self {
            partition_len,
            parallel,
        };
        config.validate()?;
        Ok(config)
    }

    /// Elements per partition when reducing segments.
    pub const fn partition_len(&self) -> usize {
        self.partition_len
    }

    /// Whether segments are reduced on the rayon pool.
    ///
    /// Only takes effect when the crate is built with the `parallel` feature.
    pub const fn parallel(&self) -> bool {
        self.parallel
    }

    /// Check the configuration's invariants.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::InvalidArgument`] if `partition_len` is 0
    pub fn validate(&self) -> Result<()> {
        if self.partition_len == 0 {
            return Err(LimbKitError::InvalidArgument(
                "partition_len must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::InvalidArgument`] if the TOML is malformed or invalid
    pub fn from_toml(toml: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml).map_err(|e| LimbKitError::InvalidArgument(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML document.
    ///
    /// # Errors
    ///
    /// - [`LimbKitError::InvalidArgument`] if serialization fails
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| LimbKitError::InvalidArgument(e.to_string()))
    }
}
