//! Log Query Demo
//!
//! Writes a month of log records into an in-memory table store, then reads the
//! newest records through a cached top-N query and a cached date range query.
//!
//! Usage:
//!   cargo run --example log_query_demo
//!
//! Environment variables (all optional, `.env` is honoured):
//!   TABLE_CACHE_MAX_ENTRIES            - cache capacity (default: 10000)
//!   TABLE_CACHE_AUTO_CLEANUP           - run the cleanup task (default: true)
//!   TABLE_CACHE_CLEANUP_INTERVAL_SECS  - cleanup period (default: 300)
//!   RUST_LOG                           - log filter (default: ouroboros_table=debug,log_query_demo=info)

use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use ouroboros_table::cache::spawn_auto_cleanup;
use ouroboros_table::{
    keys, CacheConfig, CachePolicy, EqualPartitionTopN, ExpiringCache, LogRecord,
    MemoryTableStore, PartitionDateRange, QueryCache, SortOrder, TableEntity, TableQuery,
    TableStore,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("ouroboros_table=debug,log_query_demo=info")),
        )
        .init();

    info!("=== Log Query Demo ===");

    let config = CacheConfig::from_env()?;
    info!(
        "Cache config: max_entries={}, cleanup every {:?}",
        config.max_entries, config.cleanup_interval
    );
    let cache = Arc::new(ExpiringCache::new(config));
    let cleanup = spawn_auto_cleanup(cache.clone());

    let store = MemoryTableStore::new();
    let start = Utc.with_ymd_and_hms(2015, 3, 1, 0, 0, 0).unwrap();
    for i in 0..48 {
        let level = if i % 7 == 0 { "error" } else { "info" };
        let record = LogRecord::new(
            "BILLING",
            start + ChronoDuration::hours(i * 6),
            level,
            format!("invoice batch {} processed", i),
        );
        store.upsert(record.to_entity(SortOrder::Descending)?).await?;
    }
    info!("Seeded {} log records", store.len().await);

    info!("\n--- Newest records (top-N of one partition) ---");
    let newest = QueryCache::builder()
        .query(EqualPartitionTopN::new("billing_201503", 5)?)
        .cache(cache.clone())
        .policy(CachePolicy::sliding(Duration::from_secs(30)))
        .build()?;

    for round in 1..=2 {
        let rows = newest.execute(&store).await?;
        info!("Round {}: {} rows", round, rows.len());
        for row in &rows {
            let record = LogRecord::from_entity(row)?;
            info!("  {} [{}] {}", record.timestamp, record.level, record.message);
        }
    }

    info!("\n--- Daily partitions between two dates ---");
    for day in 1..=10 {
        let at = start + ChronoDuration::days(day);
        store
            .upsert(TableEntity::new(keys::date_boundary(at)?, "summary").with_property("day", day))
            .await?;
    }

    let range = QueryCache::builder()
        .query(PartitionDateRange::new(
            start + ChronoDuration::days(3),
            start + ChronoDuration::days(7),
        )?)
        .cache(cache.clone())
        .policy(CachePolicy::expires_in(Duration::from_secs(60)))
        .build()?;

    for round in 1..=2 {
        let rows = range.execute(&store).await?;
        info!(
            "Round {}: {} daily summaries for filter {}",
            round,
            rows.len(),
            range.filter()
        );
    }

    info!("\n--- Cache statistics ---");
    info!("{}", cache.stats().await);

    if let Some(handle) = cleanup {
        handle.abort();
    }

    info!("\n=== Demo Complete ===");
    Ok(())
}
