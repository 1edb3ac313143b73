//! Backend identification and capability discovery.

use std::fmt;

/// Identifies the type of store behind a data context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// Document store (MongoDB or the in-memory document store).
    DocumentStore,
    /// Wide-column attribute store (DynamoDB or the in-memory table store).
    WideColumn,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::DocumentStore => write!(f, "document-store"),
            BackendKind::WideColumn => write!(f, "wide-column"),
        }
    }
}

/// Capabilities that a data context may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendCapability {
    /// Get, list, save and delete.
    Crud,
    /// String-keyed equality filters.
    DynamicFilter,
    /// Save is a single atomic insert-or-replace.
    AtomicUpsert,
    /// Equality lookup on a secondary index with sort direction.
    IndexQuery,
    /// Version-checked saves.
    OptimisticLocking,
}

impl fmt::Display for BackendCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendCapability::Crud => "crud",
            BackendCapability::DynamicFilter => "dynamic-filter",
            BackendCapability::AtomicUpsert => "atomic-upsert",
            BackendCapability::IndexQuery => "index-query",
            BackendCapability::OptimisticLocking => "optimistic-locking",
        };
        write!(f, "{}", name)
    }
}
