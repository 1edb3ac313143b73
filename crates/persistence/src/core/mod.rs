//! Core storage traits and abstractions.
//!
//! - [`DataContext`] - Get, list, filter, upsert and delete for one entity type
//! - [`IndexQuery`] - Secondary index lookups (attribute-scan adapter only)
//! - [`VersionedContext`] - Optimistic concurrency
//! - [`BackendKind`], [`BackendCapability`] - Runtime capability discovery
//!
//! # Trait Hierarchy
//!
//! ```text
//! DataContext
//!     ├── IndexQuery
//!     └── VersionedContext
//! ```
//!
//! Backend-unique capabilities live in extension traits rather than in the
//! common contract, so code generic over `DataContext` runs against either
//! adapter.

mod backend;
mod context;
mod index;
mod versioned;

pub use backend::{BackendCapability, BackendKind};
pub use context::DataContext;
pub use index::IndexQuery;
pub use versioned::VersionedContext;
