//! Configuration Module - GC Tuning Parameters
//!
//! Manages the (small) set of parameters that affect the semi-space
//! collector's behavior. There is no concurrency and no generations here,
//! so this is a much smaller knob set than a production collector's, but
//! the shape — a `Default` + `validate` + `from_env` trio — follows the
//! same convention.

/// Configuration for the semi-space collector.
///
/// # Examples
///
/// ```rust
/// use pico_gc::GcConfig;
///
/// let config = GcConfig::default();
/// assert!(config.validate().is_ok());
///
/// let config = GcConfig {
///     initial_heap_size: 4096,
///     verbose: true,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct GcConfig {
    /// Size in bytes of each of the two semi-spaces at startup.
    ///
    /// The heap occupies `2 * initial_heap_size` bytes in total (from-space
    /// plus to-space). Default: 1 MiB.
    pub initial_heap_size: usize,

    /// Factor by which both spaces grow when a collection still cannot
    /// satisfy an allocation. Must be greater than 1.0. Default: 2.0,
    /// matching the "double the heap" rule in the execution engine's
    /// allocation-failure protocol.
    pub growth_factor: f64,

    /// Emit a `tracing` event at `info` level for every collection and
    /// every heap growth, including occupancy before/after. Default: false.
    pub verbose: bool,

    /// Track cumulative `GcStats` (collection count, bytes copied, high
    /// water mark). Cheap enough to always leave on; exists as a knob for
    /// parity with the ambient config style. Default: true.
    pub stats_enabled: bool,
}

impl Default for GcConfig {
    fn default() -> Self {
        GcConfig {
            initial_heap_size: 1024 * 1024,
            growth_factor: 2.0,
            verbose: false,
            stats_enabled: true,
        }
    }
}

impl GcConfig {
    /// Validate configuration.
    ///
    /// Returns an error if any field holds a nonsensical value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.initial_heap_size == 0 {
            return Err(ConfigError::InvalidHeapSize(
                "initial_heap_size must be > 0".to_string(),
            ));
        }

        if self.growth_factor <= 1.0 {
            return Err(ConfigError::InvalidGrowthFactor(
                "growth_factor must be > 1.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Build a configuration from environment variables, overriding
    /// defaults where present:
    /// - `PICO_GC_HEAP_SIZE` (bytes per semi-space)
    /// - `PICO_GC_GROWTH_FACTOR`
    /// - `PICO_GC_VERBOSE` (`1`/`true`)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("PICO_GC_HEAP_SIZE") {
            if let Ok(size) = val.parse::<usize>() {
                config.initial_heap_size = size;
            }
        }

        if let Ok(val) = std::env::var("PICO_GC_GROWTH_FACTOR") {
            if let Ok(factor) = val.parse::<f64>() {
                config.growth_factor = factor;
            }
        }

        if let Ok(val) = std::env::var("PICO_GC_VERBOSE") {
            config.verbose = val == "1" || val.eq_ignore_ascii_case("true");
        }

        config
    }
}

/// Error types for `GcConfig` validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid heap size: {0}")]
    InvalidHeapSize(String),

    #[error("invalid growth factor: {0}")]
    InvalidGrowthFactor(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = GcConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_heap_size_is_invalid() {
        let config = GcConfig {
            initial_heap_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn growth_factor_must_exceed_one() {
        let config = GcConfig {
            growth_factor: 1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
