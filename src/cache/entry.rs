//! Cache entry management with expiration metadata

use crate::cache::policy::{CachePolicy, CachePriority};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A cached value together with its expiration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedEntry<V> {
    /// The cached value
    pub value: V,

    /// Entry metadata
    pub metadata: EntryMetadata,
}

/// Expiration metadata recorded when an entry is inserted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// When the entry was created
    pub created_at: DateTime<Utc>,

    /// Last access time (sliding expiration is measured from here)
    pub accessed_at: DateTime<Utc>,

    /// Absolute expiry instant, if any
    pub expires_at: Option<DateTime<Utc>>,

    /// Sliding expiration window, if any
    pub sliding_expiration: Option<Duration>,

    pub priority: CachePriority,

    /// Number of times this entry has been read
    pub access_count: u64,
}

impl<V> CachedEntry<V> {
    /// Create an entry whose expiry is computed from `policy` at `now`
    ///
    /// `ttl` is the relative lifetime after jitter has been applied; the
    /// earlier of it and `policy.absolute_expiration` wins.
    pub fn new(value: V, policy: &CachePolicy, ttl: Option<Duration>, now: DateTime<Utc>) -> Self {
        let relative = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| now.checked_add_signed(ttl));

        let expires_at = match (policy.absolute_expiration, relative) {
            (Some(a), Some(r)) => Some(a.min(r)),
            (a, r) => a.or(r),
        };

        Self {
            value,
            metadata: EntryMetadata {
                created_at: now,
                accessed_at: now,
                expires_at,
                sliding_expiration: policy.sliding_expiration,
                priority: policy.priority,
                access_count: 0,
            },
        }
    }

    /// Check whether the entry is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        if let Some(expires_at) = self.metadata.expires_at {
            if now > expires_at {
                return true;
            }
        }

        if let Some(window) = self.metadata.sliding_expiration {
            let idle = (now - self.metadata.accessed_at)
                .to_std()
                .unwrap_or(Duration::ZERO);
            if idle > window {
                return true;
            }
        }

        false
    }

    /// Check whether the entry is expired now
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Record a read; restarts the sliding window
    pub fn mark_accessed(&mut self, now: DateTime<Utc>) {
        self.metadata.accessed_at = now;
        self.metadata.access_count += 1;
    }

    /// Instant at which the entry will expire if it is not touched again
    pub fn effective_expiry(&self) -> Option<DateTime<Utc>> {
        let sliding = self
            .metadata
            .sliding_expiration
            .and_then(|w| chrono::Duration::from_std(w).ok())
            .and_then(|w| self.metadata.accessed_at.checked_add_signed(w));

        match (self.metadata.expires_at, sliding) {
            (Some(a), Some(s)) => Some(a.min(s)),
            (a, s) => a.or(s),
        }
    }

    /// Get the age of the entry
    pub fn age(&self) -> Duration {
        (Utc::now() - self.metadata.created_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
