//! Entity and filter translation for the document store.
//!
//! Filters are built as structured documents, never by string templating, and
//! only from predicates that already passed schema resolution.

use serde_json::Value;

use super::client::Document;
use crate::entity::{Entity, EntityKey};
use crate::error::{BackendError, StorageResult};
use crate::types::{FilterSet, Record, from_record, json_type_name, to_record};

/// The primary key field of every stored document.
pub const ID_KEY: &str = "_id";

fn storage_key<E: Entity>(field: &str) -> &str {
    if field == E::ID_FIELD { ID_KEY } else { field }
}

/// Builds an equality filter document.
///
/// Distinct fields form a flat document. A field that appears more than once
/// turns the whole filter into an `$and` of single-field documents, since a
/// flat document can hold each key only once.
pub fn build_filter_document<E: Entity>(filters: &FilterSet) -> Document {
    let mut flat = Document::new();
    let mut repeated = false;

    for predicate in filters {
        let key = storage_key::<E>(&predicate.field).to_string();
        if flat.insert(key, predicate.value.to_json()).is_some() {
            repeated = true;
        }
    }

    if !repeated {
        return flat;
    }

    let clauses = filters
        .iter()
        .map(|predicate| {
            let mut clause = Document::new();
            clause.insert(
                storage_key::<E>(&predicate.field).to_string(),
                predicate.value.to_json(),
            );
            Value::Object(clause)
        })
        .collect();

    let mut filter = Document::new();
    filter.insert("$and".to_string(), Value::Array(clauses));
    filter
}

/// Builds a filter on the primary key.
pub fn id_filter<K: EntityKey>(id: &K) -> Document {
    let mut filter = Document::new();
    filter.insert(ID_KEY.to_string(), id.to_field_value().to_json());
    filter
}

/// Serializes an entity with its identifier stored under `_id`.
pub fn to_document<E: Entity>(entity: &E) -> StorageResult<Document> {
    let mut record = to_record(entity)?;
    let id = record.remove(E::ID_FIELD).ok_or_else(|| missing_id::<E>())?;
    record.insert(ID_KEY.to_string(), id);
    Ok(record)
}

/// Deserializes a stored document, moving `_id` back to the identifier field.
pub fn from_document<E: Entity>(mut document: Document) -> StorageResult<E> {
    let id = document.remove(ID_KEY).ok_or_else(|| missing_id::<E>())?;
    if let Value::Object(_) | Value::Array(_) = id {
        return Err(BackendError::SerializationError {
            message: format!(
                "{} document has a non-scalar _id ({})",
                E::ENTITY_NAME,
                json_type_name(&id)
            ),
        }
        .into());
    }
    let mut record: Record = document;
    record.insert(E::ID_FIELD.to_string(), id);
    from_record(record)
}

fn missing_id<E: Entity>() -> crate::error::StorageError {
    BackendError::SerializationError {
        message: format!("{} record has no '{}' field", E::ENTITY_NAME, E::ID_FIELD),
    }
    .into()
}
