//! Backend adapter implementations.
//!
//! Each adapter implements [`DataContext`](crate::core::DataContext) over a
//! narrow client trait. The in-memory clients are always compiled; the
//! production clients are gated behind feature flags.
//!
//! # Available Backends
//!
//! | Adapter | Client | Feature | Description |
//! |---------|--------|---------|-------------|
//! | [`document`] | `InMemoryDocumentStore` | - | Process-local document collections |
//! | [`document`] | `MongoDocumentClient` | `mongodb` | MongoDB document store |
//! | [`wide_column`] | `InMemoryWideColumnStore` | - | Process-local tables with indexes |
//! | [`wide_column`] | `AwsDynamoDbClient` | `dynamodb` | AWS DynamoDB |
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use storefront_persistence::backends::wide_column::InMemoryWideColumnStore;
//!
//! let store = Arc::new(InMemoryWideColumnStore::new());
//! store.create_table("products", "id");
//! assert!(store.has_table("products"));
//! ```

pub mod document;
pub mod wide_column;
