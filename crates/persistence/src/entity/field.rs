//! Field schema and dynamically-typed field values.

use std::fmt;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::{Entity, timestamp};
use crate::types::{Filter, Predicate};

/// The declared type of an entity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// UTF-8 string (also used for UUIDs and enums stored as strings).
    Text,
    /// Signed 64-bit integer.
    Integer,
    /// 64-bit floating point number.
    Float,
    /// Boolean flag.
    Boolean,
    /// UTC timestamp stored as an RFC 3339 string.
    Timestamp,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Boolean => "boolean",
            FieldKind::Timestamp => "timestamp",
        };
        write!(f, "{}", name)
    }
}

/// A value compared against an entity field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// A string value.
    Text(String),
    /// An integer value.
    Integer(i64),
    /// A floating point value.
    Float(f64),
    /// A boolean value.
    Boolean(bool),
    /// A timestamp value.
    Timestamp(DateTime<Utc>),
}

impl FieldValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Integer(_) => FieldKind::Integer,
            FieldValue::Float(_) => FieldKind::Float,
            FieldValue::Boolean(_) => FieldKind::Boolean,
            FieldValue::Timestamp(_) => FieldKind::Timestamp,
        }
    }

    /// Converts the value to the JSON form used in stored records.
    ///
    /// Timestamps use the fixed-width form of [`timestamp`], the form stored
    /// records hold them in.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Text(s) => Value::String(s.clone()),
            FieldValue::Integer(i) => Value::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            FieldValue::Boolean(b) => Value::Bool(*b),
            FieldValue::Timestamp(ts) => Value::String(timestamp::format(ts)),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(x) => write!(f, "{}", x),
            FieldValue::Boolean(b) => write!(f, "{}", b),
            FieldValue::Timestamp(ts) => write!(f, "{}", timestamp::format(ts)),
        }
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(value)
    }
}

impl From<Uuid> for FieldValue {
    fn from(value: Uuid) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// Rust types that may back an entity field.
///
/// Nullable fields are declared with the type of their present value.
pub trait FieldType: Into<FieldValue> {
    /// The kind stored for this type.
    const KIND: FieldKind;
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;
}

impl FieldType for i64 {
    const KIND: FieldKind = FieldKind::Integer;
}

impl FieldType for i32 {
    const KIND: FieldKind = FieldKind::Integer;
}

impl FieldType for u32 {
    const KIND: FieldKind = FieldKind::Integer;
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::Float;
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Boolean;
}

impl FieldType for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Timestamp;
}

impl FieldType for Uuid {
    const KIND: FieldKind = FieldKind::Text;
}

/// One entry of an entity's static field schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// The serialized field name.
    pub name: &'static str,
    /// The declared field kind.
    pub kind: FieldKind,
}

impl FieldDef {
    /// Creates a field definition.
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

/// A typed handle on one field of entity `E` holding values of type `V`.
///
/// Declared as associated consts on the entity so that predicates built from
/// it are checked for field and value type at compile time:
///
/// ```ignore
/// impl Product {
///     pub const CATEGORY_ID: Field<Product, String> = Field::new("category_id");
/// }
///
/// let filter = Product::CATEGORY_ID.equals("books");
/// ```
pub struct Field<E, V> {
    name: &'static str,
    _marker: PhantomData<fn() -> (E, V)>,
}

impl<E, V> Field<E, V> {
    /// Creates a field handle for the serialized field `name`.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    /// Returns the serialized field name.
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<E: Entity, V: FieldType> Field<E, V> {
    /// Returns the schema entry this handle describes.
    pub fn def(&self) -> FieldDef {
        FieldDef::new(self.name, V::KIND)
    }

    /// Builds an equality filter on this field.
    pub fn equals(&self, value: impl Into<V>) -> Filter<E> {
        Filter::from(Predicate::new(self.name, value.into()))
    }
}

impl<E, V> Clone for Field<E, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, V> Copy for Field<E, V> {}

impl<E, V> fmt::Debug for Field<E, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}
