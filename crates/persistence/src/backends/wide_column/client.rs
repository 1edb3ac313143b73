use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{Number, Value};

use crate::entity::FieldValue;
use crate::types::Record;

/// A typed attribute value, mirroring the wide-column wire model.
///
/// Numbers travel as strings, like on the wire. Two `N` values are equal
/// when they denote the same number (`"10"` equals `"10.0"`).
#[derive(Debug, Clone)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number in decimal string form.
    N(String),
    /// Boolean.
    Bool(bool),
    /// Explicit null.
    Null,
    /// List.
    L(Vec<AttributeValue>),
    /// Map.
    M(HashMap<String, AttributeValue>),
}

impl AttributeValue {
    /// Converts a JSON value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => AttributeValue::N(n.to_string()),
            Value::String(s) => AttributeValue::S(s.clone()),
            Value::Array(items) => AttributeValue::L(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => AttributeValue::M(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Converts back to JSON. Unparseable numbers become strings.
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::S(s) => Value::String(s.clone()),
            AttributeValue::N(n) => Number::from_str(n)
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(n.clone())),
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Null => Value::Null,
            AttributeValue::L(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            AttributeValue::M(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Converts a predicate value.
    pub fn from_field_value(value: &FieldValue) -> Self {
        Self::from_json(&value.to_json())
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::N(n) => n.parse().ok(),
            _ => None,
        }
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::N(a), AttributeValue::N(b)) => {
                match (self.as_number(), other.as_number()) {
                    (Some(x), Some(y)) => x == y,
                    _ => a == b,
                }
            }
            (AttributeValue::S(a), AttributeValue::S(b)) => a == b,
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => a == b,
            (AttributeValue::Null, AttributeValue::Null) => true,
            (AttributeValue::L(a), AttributeValue::L(b)) => a == b,
            (AttributeValue::M(a), AttributeValue::M(b)) => a == b,
            _ => false,
        }
    }
}

/// A stored item.
pub type Item = HashMap<String, AttributeValue>;

/// Converts a serialized entity into an item.
///
/// Top-level nulls are left out, so an unset optional field is an absent
/// attribute. Index key attributes may not hold NULL, and an item without
/// the key is simply not part of the index.
pub fn item_from_record(record: &Record) -> Item {
    record
        .iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
        .collect()
}

/// Converts an item back into a serialized entity.
pub fn item_to_record(item: &Item) -> Record {
    item.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
}

/// Comparison applied by a scan condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOperator {
    /// Attribute equals the value.
    Equal,
}

/// One condition evaluated against every scanned item.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanCondition {
    /// Attribute name.
    pub attribute: String,
    /// Comparison.
    pub operator: ScanOperator,
    /// Value compared against.
    pub value: AttributeValue,
}

impl ScanCondition {
    /// Creates an equality condition.
    pub fn equal(attribute: impl Into<String>, value: AttributeValue) -> Self {
        Self {
            attribute: attribute.into(),
            operator: ScanOperator::Equal,
            value,
        }
    }

    /// Evaluates the condition. A missing attribute never matches.
    pub fn matches(&self, item: &Item) -> bool {
        match self.operator {
            ScanOperator::Equal => item.get(&self.attribute) == Some(&self.value),
        }
    }
}

/// Precondition on the stored item for a conditional put.
#[derive(Debug, Clone, PartialEq)]
pub enum PutCondition {
    /// No stored item has this attribute (used with the key attribute for
    /// insert-only writes).
    AttributeNotExists(String),
    /// The stored item's attribute equals the value.
    AttributeEquals(String, AttributeValue),
}

/// A key lookup on a secondary index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuerySpec {
    /// Index name.
    pub index_name: String,
    /// Attribute the index is partitioned on.
    pub hash_key_attribute: String,
    /// Required hash key value.
    pub hash_key_value: AttributeValue,
    /// Attribute results are ordered by.
    pub sort_key_attribute: Option<String>,
    /// `true` for ascending order.
    pub scan_forward: bool,
}

/// Failures reported by a wide-column client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WideColumnClientError {
    /// A conditional write's precondition did not hold.
    ConditionFailed,
    /// The table or index does not exist.
    ResourceNotFound(String),
    /// Request rate exceeded.
    Throttled(String),
    /// The store could not be reached.
    Unavailable(String),
    /// The store rejected the request.
    InvalidInput(String),
    /// Any other failure.
    Internal(String),
}

/// The table operations the adapter needs.
#[async_trait]
pub trait WideColumnApi: Send + Sync {
    /// Reads one item by primary key.
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, WideColumnClientError>;

    /// Scans the whole table, returning the items matching every condition.
    /// Implementations drain all result pages.
    async fn scan(
        &self,
        table: &str,
        conditions: &[ScanCondition],
    ) -> Result<Vec<Item>, WideColumnClientError>;

    /// Queries a secondary index by hash key.
    async fn query(
        &self,
        table: &str,
        spec: &IndexQuerySpec,
    ) -> Result<Vec<Item>, WideColumnClientError>;

    /// Writes a whole item, replacing any item with the same key.
    async fn put_item(
        &self,
        table: &str,
        item: Item,
        condition: Option<PutCondition>,
    ) -> Result<(), WideColumnClientError>;

    /// Deletes one item by primary key.
    async fn delete_item(&self, table: &str, key: Item) -> Result<(), WideColumnClientError>;
}
