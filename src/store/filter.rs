//! Immutable filter descriptions sent to the backing store

use crate::store::entity::TableEntity;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Key column a condition compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyField {
    PartitionKey,
    RowKey,
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyField::PartitionKey => write!(f, "PartitionKey"),
            KeyField::RowKey => write!(f, "RowKey"),
        }
    }
}

/// Comparison operator (ordinal string comparison)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
}

impl CompareOp {
    /// Check whether an ordering between actual and expected satisfies this operator
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Le => ordering != Ordering::Greater,
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            CompareOp::Eq => "eq",
            CompareOp::Ne => "ne",
            CompareOp::Gt => "gt",
            CompareOp::Ge => "ge",
            CompareOp::Lt => "lt",
            CompareOp::Le => "le",
        };
        write!(f, "{}", op)
    }
}

/// A single key comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub field: KeyField,
    pub op: CompareOp,
    pub value: String,
}

impl Condition {
    pub fn new(field: KeyField, op: CompareOp, value: impl Into<String>) -> Self {
        Self {
            field,
            op,
            value: value.into(),
        }
    }

    /// Evaluate the condition against an entity
    pub fn matches(&self, entity: &TableEntity) -> bool {
        let actual = match self.field {
            KeyField::PartitionKey => entity.partition_key.as_str(),
            KeyField::RowKey => entity.row_key.as_str(),
        };
        self.op.accepts(actual.cmp(self.value.as_str()))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} '{}'",
            self.field,
            self.op,
            self.value.replace('\'', "''")
        )
    }
}

/// Conjunction of key comparisons with an optional result limit
///
/// Filters are built once and never mutated; every builder method consumes
/// and returns the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableFilter {
    conditions: Vec<Condition>,
    take: Option<usize>,
}

impl TableFilter {
    /// Create an empty filter (matches every entity)
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition to the conjunction
    pub fn and(mut self, field: KeyField, op: CompareOp, value: impl Into<String>) -> Self {
        self.conditions.push(Condition::new(field, op, value));
        self
    }

    /// Partition key equality
    pub fn partition_eq(self, value: impl Into<String>) -> Self {
        self.and(KeyField::PartitionKey, CompareOp::Eq, value)
    }

    /// Inclusive partition key range
    pub fn partition_between(self, lower: impl Into<String>, upper: impl Into<String>) -> Self {
        self.and(KeyField::PartitionKey, CompareOp::Ge, lower)
            .and(KeyField::PartitionKey, CompareOp::Le, upper)
    }

    /// Limit the number of returned entities
    pub fn with_take(mut self, take: usize) -> Self {
        self.take = Some(take);
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn take(&self) -> Option<usize> {
        self.take
    }

    /// Check whether an entity satisfies every condition
    pub fn matches(&self, entity: &TableEntity) -> bool {
        self.conditions.iter().all(|c| c.matches(entity))
    }
}

impl fmt::Display for TableFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let expression: Vec<String> = self.conditions.iter().map(|c| c.to_string()).collect();
        write!(f, "{}", expression.join(" and "))
    }
}
