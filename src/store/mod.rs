//! Boundary to the partitioned table store
//!
//! The crate does not speak any store wire protocol. Callers hand in a
//! [`TableStore`] implementation; queries describe what they want with an
//! immutable [`TableFilter`] and the store decides how to scan for it.

pub mod entity;
pub mod filter;
pub mod memory;

pub use entity::{LogRecord, TableEntity};
pub use filter::{CompareOp, Condition, KeyField, TableFilter};
pub use memory::MemoryTableStore;

use crate::error::Result;
use async_trait::async_trait;

/// A partitioned key-value store supporting key scans and upserts
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Scan for entities matching the filter
    ///
    /// Results are ordered ascending by `(partition_key, row_key)` and truncated
    /// to `filter.take()` when set. Failures should be reported as
    /// [`TableError::StoreFailure`](crate::error::TableError::StoreFailure).
    async fn query(&self, filter: &TableFilter) -> Result<Vec<TableEntity>>;

    /// Insert or replace the entity stored under its key pair
    async fn upsert(&self, entity: TableEntity) -> Result<()>;
}
