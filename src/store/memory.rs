//! In-process table store
//!
//! Keeps entities in a `BTreeMap` keyed by `(partition_key, row_key)`, so scans
//! return entities in the same ordinal order a table service would.

use crate::error::Result;
use crate::store::{entity::TableEntity, filter::TableFilter, TableStore};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Ordered in-memory implementation of [`TableStore`]
#[derive(Debug, Clone, Default)]
pub struct MemoryTableStore {
    rows: Arc<RwLock<BTreeMap<(String, String), TableEntity>>>,
}

impl MemoryTableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities
    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn query(&self, filter: &TableFilter) -> Result<Vec<TableEntity>> {
        let rows = self.rows.read().await;
        let limit = filter.take().unwrap_or(usize::MAX);

        let result: Vec<TableEntity> = rows
            .values()
            .filter(|entity| filter.matches(entity))
            .take(limit)
            .cloned()
            .collect();

        debug!("Scan [{}] returned {} entities", filter, result.len());
        Ok(result)
    }

    async fn upsert(&self, mut entity: TableEntity) -> Result<()> {
        entity.timestamp = Some(Utc::now());
        let mut rows = self.rows.write().await;
        rows.insert(entity.key(), entity);
        Ok(())
    }
}
