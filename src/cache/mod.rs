//! # Expiring Result Cache
//!
//! A process-local map from query fingerprint to query result, where every
//! entry carries the [`CachePolicy`] it was inserted with.
//!
//! ## Features
//!
//! - **Absolute expiration**: entries die at a fixed instant, or a fixed time after insertion
//! - **Sliding expiration**: entries die after a period without reads
//! - **Priorities**: `NotRemovable` entries are never chosen by capacity eviction
//! - **LRU Eviction**: least recently used entries make room above `max_entries`
//! - **Metrics**: hit/miss/expiry/eviction counters
//!
//! There is no global instance. Build one, wrap it in an `Arc`, and hand it to
//! every [`QueryCache`](crate::query::QueryCache) that should share it.
//!
//! ## Example
//!
//! ```rust
//! use ouroboros_table::cache::{CacheConfig, CachePolicy, ExpiringCache};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CacheConfig::builder().max_entries(10_000).build();
//! let cache: ExpiringCache<Vec<String>> = ExpiringCache::new(config);
//!
//! let policy = CachePolicy::sliding(Duration::from_secs(300));
//! cache.set("top_n|3:APP|2:10", vec!["row".to_string()], &policy).await?;
//!
//! if let Some(rows) = cache.try_get("top_n|3:APP|2:10").await {
//!     println!("Cache hit: {} rows", rows.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod policy;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::{CachedEntry, EntryMetadata};
pub use policy::{CachePolicy, CachePriority};
pub use store::{spawn_auto_cleanup, start_auto_cleanup, ExpiringCache};
pub use types::{CacheStats, Fingerprint};
