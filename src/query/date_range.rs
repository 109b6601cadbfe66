//! Partition range scan between two instants

use crate::error::Result;
use crate::keys;
use crate::query::{FingerprintBuilder, TableQuery};
use crate::store::TableFilter;
use chrono::{DateTime, Utc};

const TAG: &str = "partition_date_range";

/// Entities whose partition key lies between two date boundaries (inclusive)
///
/// Boundaries come from [`keys::date_boundary`]. No ordering between `start`
/// and `end` is enforced: when `start > end` the range is simply empty.
#[derive(Debug, Clone)]
pub struct PartitionDateRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    lower: String,
    upper: String,
    fingerprint: String,
    filter: TableFilter,
}

impl PartitionDateRange {
    /// Create a range query; fails with `InvalidArgument` for instants outside the tick range
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        let lower = keys::date_boundary(start)?;
        let upper = keys::date_boundary(end)?;

        let fingerprint = FingerprintBuilder::new(TAG)
            .part(&lower)
            .part(&upper)
            .build();
        let filter = TableFilter::new().partition_between(lower.clone(), upper.clone());

        Ok(Self {
            start,
            end,
            lower,
            upper,
            fingerprint,
            filter,
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Lower and upper boundary strings
    pub fn bounds(&self) -> (&str, &str) {
        (&self.lower, &self.upper)
    }

    /// True when `start > end`, i.e. nothing can match
    pub fn is_empty_range(&self) -> bool {
        self.start > self.end
    }
}

impl TableQuery for PartitionDateRange {
    fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    fn filter(&self) -> &TableFilter {
        &self.filter
    }
}
