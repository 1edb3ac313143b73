//! Filter predicates.
//!
//! A filter is a conjunction of field equality predicates. There is no OR.
//! String-keyed filters ([`FilterSet`]) are checked against the entity schema
//! by [`resolve`] under a [`FilterPolicy`]; typed filters ([`Filter`]) are built
//! from [`Field`](crate::entity::Field) handles.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, FieldValue};
use crate::error::{FilterError, StorageResult};

/// A single `field == value` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// The serialized field name.
    pub field: String,
    /// The expected value.
    pub value: FieldValue,
}

impl Predicate {
    /// Creates a predicate.
    pub fn new(field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.field, self.value)
    }
}

/// An ordered conjunction of predicates. All must match.
///
/// An empty set matches every record.
///
/// # Examples
///
/// ```
/// use storefront_persistence::types::FilterSet;
///
/// let filters = FilterSet::new()
///     .with("name", "Widget")
///     .with("is_available", true);
/// assert_eq!(filters.len(), 2);
///
/// let same: FilterSet = [("name", "Widget")].into_iter().collect();
/// assert_eq!(same.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a predicate (builder style).
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.push(Predicate::new(field, value));
        self
    }

    /// Adds a predicate.
    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Returns `true` if the set has no predicates.
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Returns the number of predicates.
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    /// Iterates over the predicates in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.predicates.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for FilterSet
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            predicates: iter
                .into_iter()
                .map(|(field, value)| Predicate::new(field, value))
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.iter()
    }
}

/// A typed conjunction of predicates on entity `E`.
pub struct Filter<E> {
    set: FilterSet,
    _marker: PhantomData<fn() -> E>,
}

impl<E> Filter<E> {
    /// Combines two filters; both must match.
    pub fn and(mut self, other: Filter<E>) -> Self {
        self.set.predicates.extend(other.set.predicates);
        self
    }

    /// Returns the underlying predicates.
    pub fn as_set(&self) -> &FilterSet {
        &self.set
    }

    /// Consumes the filter, returning the underlying predicates.
    pub fn into_set(self) -> FilterSet {
        self.set
    }
}

impl<E> From<Predicate> for Filter<E> {
    fn from(predicate: Predicate) -> Self {
        Self {
            set: FilterSet {
                predicates: vec![predicate],
            },
            _marker: PhantomData,
        }
    }
}

impl<E> Clone for Filter<E> {
    fn clone(&self) -> Self {
        Self {
            set: self.set.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E> fmt::Debug for Filter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.set).finish()
    }
}

/// How string-keyed predicates on unknown or mistyped fields are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterPolicy {
    /// Drop the offending predicate and log a warning. The query matches
    /// more records than requested.
    #[default]
    Lenient,
    /// Fail the operation before any backend call.
    Strict,
}

/// Checks every predicate against the schema of `E`.
///
/// A predicate survives when it names the identifier or a declared field and
/// its value has exactly the declared kind (an integer never matches a float
/// field). Offending predicates are dropped or rejected according to `policy`.
pub fn resolve<E: Entity>(filters: &FilterSet, policy: FilterPolicy) -> StorageResult<FilterSet> {
    let mut resolved = FilterSet::new();

    for predicate in filters {
        let offence = match E::field_kind(&predicate.field) {
            None => FilterError::UnknownField {
                entity: E::ENTITY_NAME.to_string(),
                field: predicate.field.clone(),
            },
            Some(kind) if kind != predicate.value.kind() => FilterError::TypeMismatch {
                entity: E::ENTITY_NAME.to_string(),
                field: predicate.field.clone(),
                expected: kind,
                actual: predicate.value.kind(),
            },
            Some(_) => {
                resolved.push(predicate.clone());
                continue;
            }
        };

        match policy {
            FilterPolicy::Strict => return Err(offence.into()),
            FilterPolicy::Lenient => {
                tracing::warn!(
                    entity = E::ENTITY_NAME,
                    field = %predicate.field,
                    reason = %offence,
                    "dropping filter predicate"
                );
            }
        }
    }

    Ok(resolved)
}
