//! Per-entry eviction policy

use crate::error::{Result, TableError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Eviction priority when the cache is at capacity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePriority {
    /// May be evicted by the capacity bound
    #[default]
    Default,
    /// Only leaves the cache by expiry or explicit removal
    NotRemovable,
}

impl CachePriority {
    pub fn is_removable(&self) -> bool {
        matches!(self, CachePriority::Default)
    }
}

/// How long a cached result stays valid
///
/// Absolute, relative and sliding expiration may be combined; an entry is
/// expired as soon as any of them says so. The default policy never expires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachePolicy {
    /// Fixed wall-clock instant after which the entry is expired
    pub absolute_expiration: Option<DateTime<Utc>>,

    /// Absolute expiration measured from insertion time
    pub time_to_live: Option<Duration>,

    /// Maximum idle time between accesses
    pub sliding_expiration: Option<Duration>,

    pub priority: CachePriority,
}

impl CachePolicy {
    /// Policy that never expires entries
    pub fn never_expires() -> Self {
        Self::default()
    }

    /// Expire at a fixed instant
    pub fn absolute(at: DateTime<Utc>) -> Self {
        Self {
            absolute_expiration: Some(at),
            ..Default::default()
        }
    }

    /// Expire a fixed duration after insertion
    pub fn expires_in(ttl: Duration) -> Self {
        Self {
            time_to_live: Some(ttl),
            ..Default::default()
        }
    }

    /// Expire after a period without access
    pub fn sliding(window: Duration) -> Self {
        Self {
            sliding_expiration: Some(window),
            ..Default::default()
        }
    }

    pub fn with_absolute_expiration(mut self, at: DateTime<Utc>) -> Self {
        self.absolute_expiration = Some(at);
        self
    }

    pub fn with_time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    pub fn with_sliding_expiration(mut self, window: Duration) -> Self {
        self.sliding_expiration = Some(window);
        self
    }

    pub fn with_priority(mut self, priority: CachePriority) -> Self {
        self.priority = priority;
        self
    }

    /// Check whether the policy can ever expire an entry
    pub fn is_eternal(&self) -> bool {
        self.absolute_expiration.is_none()
            && self.time_to_live.is_none()
            && self.sliding_expiration.is_none()
    }

    /// Validate the policy
    pub fn validate(&self) -> Result<()> {
        if self.sliding_expiration == Some(Duration::ZERO) {
            return Err(TableError::InvalidArgument(
                "sliding_expiration must be greater than 0".to_string(),
            ));
        }

        if self.time_to_live == Some(Duration::ZERO) {
            return Err(TableError::InvalidArgument(
                "time_to_live must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
