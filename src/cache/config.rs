//! Configuration for the expiring cache

use crate::error::{Result, TableError};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Environment variable names read by [`CacheConfig::from_env`]
pub const ENV_MAX_ENTRIES: &str = "TABLE_CACHE_MAX_ENTRIES";
pub const ENV_TTL_JITTER: &str = "TABLE_CACHE_TTL_JITTER";
pub const ENV_AUTO_CLEANUP: &str = "TABLE_CACHE_AUTO_CLEANUP";
pub const ENV_CLEANUP_INTERVAL_SECS: &str = "TABLE_CACHE_CLEANUP_INTERVAL_SECS";
pub const ENV_METRICS: &str = "TABLE_CACHE_METRICS";

/// Configuration for an [`ExpiringCache`](crate::cache::ExpiringCache)
///
/// Expiration itself is decided per entry by its
/// [`CachePolicy`](crate::cache::CachePolicy); this only bounds the cache
/// as a whole.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries before least recently used entries are evicted
    pub max_entries: usize,

    /// Jitter factor (0.0 - 1.0) applied to relative time-to-live policies
    /// so that results cached together do not all expire together
    pub ttl_jitter: f64,

    /// Enable automatic cleanup of expired entries
    pub enable_auto_cleanup: bool,

    /// Interval for automatic cleanup checks
    pub cleanup_interval: Duration,

    /// Enable hit/miss/eviction counters
    pub enable_metrics: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl_jitter: 0.0,
            enable_auto_cleanup: true,
            // Cleanup every 5 minutes
            cleanup_interval: Duration::from_secs(300),
            enable_metrics: true,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Load configuration from the environment (and a `.env` file if present)
    ///
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }

        let mut builder = CacheConfig::builder();

        if let Some(max) = env_value::<usize>(ENV_MAX_ENTRIES)? {
            builder = builder.max_entries(max);
        }
        if let Some(jitter) = env_value::<f64>(ENV_TTL_JITTER)? {
            builder = builder.ttl_jitter(jitter);
        }
        if let Some(enable) = env_value::<bool>(ENV_AUTO_CLEANUP)? {
            builder = builder.enable_auto_cleanup(enable);
        }
        if let Some(secs) = env_value::<u64>(ENV_CLEANUP_INTERVAL_SECS)? {
            builder = builder.cleanup_interval(Duration::from_secs(secs));
        }
        if let Some(enable) = env_value::<bool>(ENV_METRICS)? {
            builder = builder.enable_metrics(enable);
        }

        let config = builder.build();
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(TableError::ConfigError(
                "max_entries must be greater than 0".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.ttl_jitter) {
            return Err(TableError::ConfigError(
                "ttl_jitter must be between 0.0 and 1.0".to_string(),
            ));
        }

        if self.enable_auto_cleanup && self.cleanup_interval.is_zero() {
            return Err(TableError::ConfigError(
                "cleanup_interval must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply the configured jitter to a relative time-to-live
    ///
    /// The jitter factor is clamped to `0.0..=1.0`. A jittered value that no
    /// longer fits in a `Duration` falls back to `ttl` unchanged.
    pub fn ttl_with_jitter(&self, ttl: Duration) -> Duration {
        let factor = if self.ttl_jitter.is_finite() {
            self.ttl_jitter.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if factor == 0.0 {
            return ttl;
        }

        let base_secs = ttl.as_secs_f64();
        let jitter_range = base_secs * factor;
        let jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter_range;
        let final_secs = (base_secs + jitter).max(0.001);

        Duration::try_from_secs_f64(final_secs).unwrap_or(ttl)
    }
}

fn env_value<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| TableError::ConfigError(format!("{} has invalid value '{}'", name, raw))),
        Err(_) => Ok(None),
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    max_entries: Option<usize>,
    ttl_jitter: Option<f64>,
    enable_auto_cleanup: Option<bool>,
    cleanup_interval: Option<Duration>,
    enable_metrics: Option<bool>,
}

impl CacheConfigBuilder {
    /// Set maximum number of cache entries
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set TTL jitter factor (0.0 - 1.0)
    pub fn ttl_jitter(mut self, jitter: f64) -> Self {
        self.ttl_jitter = Some(jitter);
        self
    }

    /// Enable or disable automatic cleanup
    pub fn enable_auto_cleanup(mut self, enable: bool) -> Self {
        self.enable_auto_cleanup = Some(enable);
        self
    }

    /// Set cleanup interval
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Enable or disable metrics collection
    pub fn enable_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = Some(enable);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            ttl_jitter: self.ttl_jitter.unwrap_or(defaults.ttl_jitter),
            enable_auto_cleanup: self
                .enable_auto_cleanup
                .unwrap_or(defaults.enable_auto_cleanup),
            cleanup_interval: self.cleanup_interval.unwrap_or(defaults.cleanup_interval),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
        }
    }
}

/// Preset configurations
impl CacheConfig {
    /// Configuration for memory-constrained environments
    pub fn small() -> Self {
        Self {
            max_entries: 1_000,
            cleanup_interval: Duration::from_secs(60),
            ..Default::default()
        }
    }

    /// Configuration for processes serving many distinct queries
    pub fn large() -> Self {
        Self {
            max_entries: 1_000_000,
            ttl_jitter: 0.10,
            cleanup_interval: Duration::from_secs(600),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.max_entries, 10_000);
        assert_eq!(config.ttl_jitter, 0.0);
        assert!(config.enable_auto_cleanup);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut invalid = CacheConfig::default();
        invalid.max_entries = 0;
        assert!(matches!(invalid.validate(), Err(TableError::ConfigError(_))));

        let mut invalid = CacheConfig::default();
        invalid.ttl_jitter = 1.5;
        assert!(invalid.validate().is_err());

        let mut invalid = CacheConfig::default();
        invalid.cleanup_interval = Duration::ZERO;
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::builder()
            .max_entries(5000)
            .ttl_jitter(0.1)
            .enable_metrics(false)
            .build();

        assert_eq!(config.max_entries, 5000);
        assert_eq!(config.ttl_jitter, 0.1);
        assert!(!config.enable_metrics);
        assert_eq!(config.cleanup_interval, Duration::from_secs(300));
    }

    #[test]
    fn test_ttl_with_jitter() {
        let config = CacheConfig::builder().ttl_jitter(0.1).build();

        let ttl = config.ttl_with_jitter(Duration::from_secs(3600));
        assert!(ttl.as_secs_f64() >= 3240.0);
        assert!(ttl.as_secs_f64() <= 3960.0);

        let exact = CacheConfig::default().ttl_with_jitter(Duration::from_secs(3600));
        assert_eq!(exact, Duration::from_secs(3600));
    }

    #[test]
    fn test_ttl_with_jitter_saturates_on_overflow() {
        let config = CacheConfig::large();
        for _ in 0..50 {
            let ttl = config.ttl_with_jitter(Duration::MAX);
            assert!(ttl >= Duration::from_secs(u64::MAX / 2));
        }
    }

    #[test]
    fn test_ttl_with_jitter_clamps_factor() {
        let config = CacheConfig::builder().ttl_jitter(5.0).build();
        assert!(config.validate().is_err());

        for _ in 0..50 {
            let ttl = config.ttl_with_jitter(Duration::from_secs(100));
            assert!(ttl <= Duration::from_secs(200));
        }

        let nan = CacheConfig::builder().ttl_jitter(f64::NAN).build();
        assert_eq!(nan.ttl_with_jitter(Duration::from_secs(100)), Duration::from_secs(100));
    }

    #[test]
    fn test_preset_configs() {
        assert_eq!(CacheConfig::small().max_entries, 1_000);
        assert_eq!(CacheConfig::large().max_entries, 1_000_000);
        assert!(CacheConfig::large().validate().is_ok());
    }

    #[test]
    fn test_from_env() {
        std::env::set_var(ENV_MAX_ENTRIES, "42");
        std::env::set_var(ENV_AUTO_CLEANUP, "false");
        let config = CacheConfig::from_env().unwrap();
        assert_eq!(config.max_entries, 42);
        assert!(!config.enable_auto_cleanup);

        std::env::set_var(ENV_MAX_ENTRIES, "lots");
        let err = CacheConfig::from_env().unwrap_err();
        assert!(matches!(err, TableError::ConfigError(_)));

        std::env::remove_var(ENV_MAX_ENTRIES);
        std::env::remove_var(ENV_AUTO_CLEANUP);
    }
}
