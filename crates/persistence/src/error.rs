//! Error types for the persistence layer.
//!
//! This module defines all error types used throughout the persistence layer,
//! following a hierarchy that separates resource state errors, concurrency
//! errors, validation errors, filter errors and backend errors.
//!
//! Lookups never fail with "not found": a missing record is `Ok(None)` and an
//! unmatched filter is an empty `Vec`. Backend failures are always surfaced as
//! [`BackendError`]s rather than degraded into empty results.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

use crate::entity::FieldKind;

/// The primary error type for all storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Resource state errors
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Concurrency and versioning errors
    #[error(transparent)]
    Concurrency(#[from] ConcurrencyError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Filter and query construction errors
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns `true` if this error reports a missing entity.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Resource(ResourceError::NotFound { .. }))
    }

    /// Returns `true` if this error reports an optimistic locking conflict.
    pub fn is_conflict(&self) -> bool {
        matches!(self, StorageError::Concurrency(_))
    }
}

/// Errors related to entity state.
#[derive(Error, Debug)]
pub enum ResourceError {
    /// The entity to operate on does not exist.
    #[error("{entity} does not exist: {id}")]
    NotFound { entity: String, id: String },

    /// An entity with the given identifier already exists.
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: String, id: String },
}

/// Errors related to concurrency control.
#[derive(Error, Debug)]
pub enum ConcurrencyError {
    /// Version conflict detected during optimistic locking.
    #[error("version conflict on {entity}/{id}: expected {expected_version}, found {}", display_version(.actual_version))]
    VersionConflict {
        entity: String,
        id: String,
        expected_version: u64,
        actual_version: Option<u64>,
    },
}

fn display_version(version: &Option<u64>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "none".to_string(),
    }
}

/// Errors related to entity and argument validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// The entity failed its declared field constraints.
    #[error("invalid {entity}: {message}")]
    InvalidEntity {
        entity: String,
        message: String,
        details: Vec<ValidationDetail>,
    },

    /// A configuration value is missing or malformed.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    /// An argument passed to an operation is out of range.
    #[error("invalid argument '{argument}': {message}")]
    InvalidArgument { argument: String, message: String },
}

/// Detailed validation error information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetail {
    /// The name of the field with the error.
    pub path: String,
    /// A human-readable error message.
    pub message: String,
}

impl ValidationDetail {
    /// Creates a detail for the given field.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Errors raised while translating filters and index queries.
#[derive(Error, Debug)]
pub enum FilterError {
    /// The filter names a field the entity does not declare.
    #[error("unknown field '{field}' on {entity}")]
    UnknownField { entity: String, field: String },

    /// The filter value does not have the declared type of the field.
    #[error("field '{field}' on {entity} is {expected}, got {actual}")]
    TypeMismatch {
        entity: String,
        field: String,
        expected: FieldKind,
        actual: FieldKind,
    },

    /// An index query was issued without an index name.
    #[error("index name cannot be empty")]
    MissingIndexName,

    /// An index query named an index the table does not declare.
    #[error("index '{index}' is not declared on table '{table}'")]
    UnknownIndex { table: String, index: String },
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend is currently unavailable.
    #[error("backend unavailable: {backend_name}: {message}")]
    Unavailable {
        backend_name: String,
        message: String,
    },

    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Query execution error.
    #[error("query execution failed in {backend_name}: {message}")]
    QueryError {
        backend_name: String,
        message: String,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {message}")]
    SerializationError { message: String },

    /// The caller cancelled the operation.
    #[error("{operation} was cancelled")]
    Cancelled { operation: String },

    /// The operation did not complete in time.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout { operation: String, timeout_ms: u64 },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Backend(BackendError::SerializationError {
            message: err.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let err = StorageError::Resource(ResourceError::NotFound {
            entity: "Product".to_string(),
            id: "123".to_string(),
        });
        assert_eq!(err.to_string(), "Product does not exist: 123");
        assert!(err.is_not_found());
        assert!(!err.is_conflict());
    }

    #[test]
    fn test_concurrency_error_display() {
        let err = ConcurrencyError::VersionConflict {
            entity: "Product".to_string(),
            id: "123".to_string(),
            expected_version: 1,
            actual_version: Some(2),
        };
        assert_eq!(
            err.to_string(),
            "version conflict on Product/123: expected 1, found 2"
        );

        let err = ConcurrencyError::VersionConflict {
            entity: "Product".to_string(),
            id: "123".to_string(),
            expected_version: 0,
            actual_version: None,
        };
        assert!(err.to_string().ends_with("found none"));
    }

    #[test]
    fn test_filter_error_display() {
        let err = FilterError::TypeMismatch {
            entity: "Product".to_string(),
            field: "price".to_string(),
            expected: FieldKind::Float,
            actual: FieldKind::Text,
        };
        assert_eq!(err.to_string(), "field 'price' on Product is float, got text");
        assert_eq!(
            FilterError::MissingIndexName.to_string(),
            "index name cannot be empty"
        );
    }

    #[test]
    fn test_validation_detail_display() {
        let detail = ValidationDetail::new("email", "is required");
        assert_eq!(detail.to_string(), "email: is required");
    }

    #[test]
    fn test_storage_error_from_serde() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let storage_err: StorageError = err.into();
        assert!(matches!(
            storage_err,
            StorageError::Backend(BackendError::SerializationError { .. })
        ));
    }
}
