//! Top-N scan of a single partition

use crate::error::{Result, TableError};
use crate::query::{FingerprintBuilder, TableQuery};
use crate::store::TableFilter;

/// Default number of entities returned by [`EqualPartitionTopN`]
pub const DEFAULT_TAKE: i64 = 100;

const TAG: &str = "equal_partition_top_n";

/// First `take` entities of one partition, in row key order
///
/// The partition key is upper-cased before it reaches the filter, so the
/// comparison is case-insensitive for stores holding upper-cased keys.
#[derive(Debug, Clone)]
pub struct EqualPartitionTopN {
    partition_key: String,
    take: usize,
    fingerprint: String,
    filter: TableFilter,
}

impl EqualPartitionTopN {
    /// Create a query for `partition_key` limited to `take` entities
    ///
    /// Fails with `InvalidArgument` when the key is blank or `take <= 0`.
    pub fn new(partition_key: &str, take: i64) -> Result<Self> {
        if partition_key.trim().is_empty() {
            return Err(TableError::InvalidArgument(
                "partition key must not be empty".to_string(),
            ));
        }

        if take <= 0 {
            return Err(TableError::InvalidArgument(format!(
                "take must be greater than 0, got {}",
                take
            )));
        }

        let take = usize::try_from(take)
            .map_err(|_| TableError::InvalidArgument(format!("take {} is too large", take)))?;
        let partition_key = partition_key.to_uppercase();

        let fingerprint = FingerprintBuilder::new(TAG)
            .part(&partition_key)
            .part(take)
            .build();
        let filter = TableFilter::new()
            .partition_eq(partition_key.clone())
            .with_take(take);

        Ok(Self {
            partition_key,
            take,
            fingerprint,
            filter,
        })
    }

    /// Create a query with [`DEFAULT_TAKE`]
    pub fn with_default_take(partition_key: &str) -> Result<Self> {
        Self::new(partition_key, DEFAULT_TAKE)
    }

    /// The normalized partition key
    pub fn partition_key(&self) -> &str {
        &self.partition_key
    }

    pub fn take(&self) -> usize {
        self.take
    }
}

impl TableQuery for EqualPartitionTopN {
    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn filter(&self) -> &TableFilter {
        &self.filter
    }
}
