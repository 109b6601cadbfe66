//! Fingerprinted table queries
//!
//! A [`TableQuery`] fixes its filter and fingerprint when it is constructed.
//! The fingerprint is a deterministic string built from every parameter that
//! changes the result, so it can key a result cache.
//!
//! ```rust
//! use ouroboros_table::query::{EqualPartitionTopN, QueryCache, TableQuery};
//! use ouroboros_table::cache::ExpiringCache;
//! use ouroboros_table::store::MemoryTableStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let store = MemoryTableStore::new();
//! let cache = Arc::new(ExpiringCache::with_defaults());
//!
//! let query = EqualPartitionTopN::new("billing_201503", 20)?;
//! let cached = QueryCache::new(query, cache)?;
//!
//! let rows = cached.execute(&store).await?;   // miss: scans the store
//! let again = cached.execute(&store).await?;  // hit: store untouched
//! assert_eq!(rows, again);
//! # Ok(())
//! # }
//! ```

pub mod cached;
pub mod date_range;
pub mod top_n;

pub use cached::{QueryCache, QueryCacheBuilder, ResultCache};
pub use date_range::PartitionDateRange;
pub use top_n::{EqualPartitionTopN, DEFAULT_TAKE};

use crate::error::Result;
use crate::store::{TableEntity, TableFilter, TableStore};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// A query against a partitioned table store
///
/// New query shapes are added by implementing this trait; nothing that
/// executes queries needs to change.
#[async_trait]
pub trait TableQuery: Send + Sync {
    /// Deterministic cache key for this query's parameters
    fn fingerprint(&self) -> &str;

    /// The filter sent to the store
    fn filter(&self) -> &TableFilter;

    /// Run the query against `store`
    ///
    /// Store failures are returned unchanged.
    async fn execute(&self, store: &dyn TableStore) -> Result<Vec<TableEntity>> {
        store.query(self.filter()).await
    }
}

#[async_trait]
impl<Q> TableQuery for Arc<Q>
where
    Q: TableQuery + ?Sized,
{
    fn fingerprint(&self) -> &str {
        (**self).fingerprint()
    }

    fn filter(&self) -> &TableFilter {
        (**self).filter()
    }

    async fn execute(&self, store: &dyn TableStore) -> Result<Vec<TableEntity>> {
        (**self).execute(store).await
    }
}

/// Builds unambiguous fingerprints
///
/// Output is `tag|<len>:<part>|<len>:<part>...`; every part is prefixed with its
/// byte length, so no choice of part values can make two different parameter
/// lists render the same string.
#[derive(Debug, Clone)]
pub struct FingerprintBuilder {
    tag: String,
    parts: Vec<String>,
}

impl FingerprintBuilder {
    /// Start a fingerprint for the given query type tag
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            parts: Vec::new(),
        }
    }

    /// Append a discriminating parameter
    pub fn part(mut self, value: impl fmt::Display) -> Self {
        self.parts.push(value.to_string());
        self
    }

    /// Build the fingerprint
    pub fn build(self) -> String {
        let mut fingerprint = self.tag;
        for part in &self.parts {
            fingerprint.push_str(&format!("|{}:{}", part.len(), part));
        }
        fingerprint
    }
}
