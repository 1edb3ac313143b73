//! The entity contract.
//!
//! Any type persisted through a data context implements [`Entity`]: it
//! exposes one identifier of a declared key type and a static field schema.
//! The schema stands in for runtime reflection when string-keyed filters are
//! checked, and typed [`Field`] handles give compile-time checked filters.

mod field;
pub mod timestamp;
mod validation;

use std::fmt::Debug;

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::error::ValidationDetail;

pub use field::{Field, FieldDef, FieldKind, FieldType, FieldValue};
pub use validation::{Validator, ensure_valid};

/// Types usable as entity identifiers.
pub trait EntityKey:
    Clone + Debug + PartialEq + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// The field kind the key is stored as.
    const KIND: FieldKind;

    /// Converts the key into a predicate value.
    fn to_field_value(&self) -> FieldValue;
}

impl EntityKey for String {
    const KIND: FieldKind = FieldKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl EntityKey for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Integer(*self)
    }
}

impl EntityKey for Uuid {
    const KIND: FieldKind = FieldKind::Text;

    fn to_field_value(&self) -> FieldValue {
        FieldValue::Text(self.to_string())
    }
}

/// A persistable record type with a unique identifier.
///
/// The identifier is assigned by the caller before the first save and must not
/// change afterwards. Entities are stored as their full serde representation;
/// every save overwrites the whole record.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + 'static {
    /// The identifier type.
    type Key: EntityKey;

    /// The name used in errors and log events.
    const ENTITY_NAME: &'static str;

    /// The serialized name of the identifier field.
    const ID_FIELD: &'static str = "id";

    /// Returns the identifier.
    fn id(&self) -> &Self::Key;

    /// Replaces the identifier.
    fn set_id(&mut self, id: Self::Key);

    /// Returns the filterable fields, excluding the identifier.
    fn fields() -> &'static [FieldDef];

    /// Reports constraint violations. Valid by default.
    fn validate(&self) -> Vec<ValidationDetail> {
        Vec::new()
    }

    /// Looks up the declared kind of a field, including the identifier.
    fn field_kind(name: &str) -> Option<FieldKind> {
        if name == Self::ID_FIELD {
            return Some(<Self::Key as EntityKey>::KIND);
        }
        Self::fields()
            .iter()
            .find(|def| def.name == name)
            .map(|def| def.kind)
    }
}

/// Entities carrying an optimistic concurrency version.
///
/// A version of `0` marks an entity that has never been stored. Each
/// successful versioned save increments the version by one.
pub trait Versioned: Entity {
    /// The serialized name of the version field.
    const VERSION_FIELD: &'static str = "version";

    /// Returns the current version.
    fn version(&self) -> u64;

    /// Replaces the version.
    fn set_version(&mut self, version: u64);
}
