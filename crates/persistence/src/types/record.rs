//! Conversion between entities and untyped JSON records.

use serde_json::{Map, Value};

use crate::entity::{Entity, FieldKind, timestamp};
use crate::error::{BackendError, StorageResult};

/// An entity serialized to a JSON object.
pub type Record = Map<String, Value>;

/// Serializes an entity into a record.
///
/// Declared timestamp fields are rewritten into the fixed-width form of
/// [`timestamp`], whatever precision the entity serialized them with.
pub fn to_record<E: Entity>(entity: &E) -> StorageResult<Record> {
    match serde_json::to_value(entity)? {
        Value::Object(mut map) => {
            for def in E::fields().iter().filter(|def| def.kind == FieldKind::Timestamp) {
                if let Some(value) = map.get_mut(def.name) {
                    *value = timestamp::normalize(value.take());
                }
            }
            Ok(map)
        }
        other => Err(BackendError::SerializationError {
            message: format!(
                "{} must serialize to an object, got {}",
                E::ENTITY_NAME,
                json_type_name(&other)
            ),
        }
        .into()),
    }
}

/// Deserializes a record into an entity.
pub fn from_record<E: Entity>(record: Record) -> StorageResult<E> {
    Ok(serde_json::from_value(Value::Object(record))?)
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
