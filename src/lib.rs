//! # Ouroboros Table (ouroboros-table)
//!
//! Query result caching and chronological key encoding for partitioned
//! key-value (table) stores.
//!
//! ## Features
//!
//! - Partition/row key codec whose string order follows time, ascending or descending
//! - Fingerprinted queries: top-N of one partition, partition range between two dates
//! - Expiring result cache with absolute, relative and sliding expiration
//! - Query cache decorator that skips the store entirely on a hit
//! - Async-first design using tokio
//!
//! The crate does not talk to any particular store. Implement [`TableStore`]
//! for your client, or use [`MemoryTableStore`] in-process.
//!
//! ## Key Encoding
//!
//! Log records are grouped per application and month, and ordered inside the
//! partition by a 19 digit tick count:
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use ouroboros_table::{LogRecord, SortOrder};
//!
//! # fn example() -> ouroboros_table::Result<()> {
//! let at = Utc.with_ymd_and_hms(2015, 3, 2, 8, 0, 0).unwrap();
//! let record = LogRecord::new("myApplication", at, "info", "started");
//!
//! assert_eq!(record.partition_key()?, "myApplication_201503");
//! let newest_first = record.row_key(SortOrder::Descending)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Cached Queries
//!
//! ```rust
//! use ouroboros_table::{
//!     CachePolicy, EqualPartitionTopN, ExpiringCache, MemoryTableStore, QueryCache, TableQuery,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = MemoryTableStore::new();
//!     let cache = Arc::new(ExpiringCache::with_defaults());
//!
//!     let recent = QueryCache::builder()
//!         .query(EqualPartitionTopN::new("myApplication_201503", 50)?)
//!         .cache(cache.clone())
//!         .policy(CachePolicy::sliding(Duration::from_secs(60)))
//!         .build()?;
//!
//!     let rows = recent.execute(&store).await?;
//!     println!("{} rows, cache: {}", rows.len(), cache.stats().await);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod keys;
pub mod query;
pub mod store;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CachePolicy, CachePriority, CacheStats, CachedEntry,
    ExpiringCache, Fingerprint,
};
pub use error::{Result, TableError};
pub use keys::{create_partition_key, create_row_key, SortOrder};
pub use query::{
    EqualPartitionTopN, FingerprintBuilder, PartitionDateRange, QueryCache, QueryCacheBuilder,
    ResultCache, TableQuery,
};
pub use store::{
    CompareOp, KeyField, LogRecord, MemoryTableStore, TableEntity, TableFilter, TableStore,
};
