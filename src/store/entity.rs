//! Entities stored in the partitioned table

use crate::error::{Result, TableError};
use crate::keys::{self, SortOrder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A row in a partitioned table store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntity {
    /// Groups entities for equality and range scans
    pub partition_key: String,

    /// Orders entities within a partition
    pub row_key: String,

    /// Last write time as reported by the store
    pub timestamp: Option<DateTime<Utc>>,

    /// Remaining columns
    pub properties: BTreeMap<String, Value>,
}

impl TableEntity {
    /// Create an entity with no properties
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            timestamp: None,
            properties: BTreeMap::new(),
        }
    }

    /// Set a property, replacing any previous value
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Read a string property
    pub fn property_str(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }

    /// Composite key used for ordering and upserts
    pub fn key(&self) -> (String, String) {
        (self.partition_key.clone(), self.row_key.clone())
    }
}

/// A log line keyed for chronological scans
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: Uuid,
    pub application: String,
    pub timestamp: DateTime<Utc>,
    pub level: String,
    pub message: String,
}

impl LogRecord {
    /// Create a new record with a fresh identifier
    pub fn new(
        application: impl Into<String>,
        timestamp: DateTime<Utc>,
        level: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            application: application.into(),
            timestamp,
            level: level.into(),
            message: message.into(),
        }
    }

    /// `<application>_<YYYYMM>`
    pub fn partition_key(&self) -> Result<String> {
        keys::create_partition_key(&self.application, self.timestamp)
    }

    /// `<ticks>_<id>` in the requested direction
    pub fn row_key(&self, order: SortOrder) -> Result<String> {
        keys::create_row_key(&self.id, self.timestamp, order)
    }

    /// Convert to a storable entity
    pub fn to_entity(&self, order: SortOrder) -> Result<TableEntity> {
        let mut entity = TableEntity::new(self.partition_key()?, self.row_key(order)?);
        entity.timestamp = Some(self.timestamp);
        entity.properties = match serde_json::to_value(self)? {
            Value::Object(map) => map.into_iter().collect(),
            other => {
                return Err(TableError::SerializationError(format!(
                    "log record serialized to non-object: {}",
                    other
                )))
            }
        };
        Ok(entity)
    }

    /// Rebuild a record from entity properties
    pub fn from_entity(entity: &TableEntity) -> Result<Self> {
        let map: serde_json::Map<String, Value> = entity
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Ok(serde_json::from_value(Value::Object(map))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entity_properties() {
        let entity = TableEntity::new("pk", "rk")
            .with_property("level", "warn")
            .with_property("count", 3);

        assert_eq!(entity.property_str("level"), Some("warn"));
        assert_eq!(entity.property_str("count"), None);
        assert_eq!(entity.key(), ("pk".to_string(), "rk".to_string()));
    }

    #[test]
    fn test_log_record_keys() {
        let ts = Utc.with_ymd_and_hms(2015, 3, 2, 10, 30, 0).unwrap();
        let record = LogRecord::new("billing", ts, "info", "invoice sent");

        assert_eq!(record.partition_key().unwrap(), "billing_201503");

        let row_key = record.row_key(SortOrder::Ascending).unwrap();
        assert!(row_key.ends_with(&format!("_{}", record.id)));
        assert_eq!(row_key.find('_'), Some(keys::TICK_WIDTH));
    }

    #[test]
    fn test_log_record_entity_conversion() {
        let ts = Utc.with_ymd_and_hms(2015, 3, 2, 10, 30, 0).unwrap();
        let record = LogRecord::new("billing", ts, "error", "payment declined");

        let entity = record.to_entity(SortOrder::Descending).unwrap();
        assert_eq!(entity.partition_key, "billing_201503");
        assert_eq!(entity.timestamp, Some(ts));
        assert_eq!(entity.property_str("message"), Some("payment declined"));

        let restored = LogRecord::from_entity(&entity).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_log_record_blank_application() {
        let record = LogRecord::new(" ", Utc::now(), "info", "x");
        assert!(record.partition_key().unwrap_err().is_invalid_argument());
        assert!(record.to_entity(SortOrder::Ascending).is_err());
    }

    #[test]
    fn test_from_entity_missing_fields() {
        let entity = TableEntity::new("pk", "rk").with_property("level", "info");
        let err = LogRecord::from_entity(&entity).unwrap_err();
        assert!(matches!(err, TableError::SerializationError(_)));
    }
}
