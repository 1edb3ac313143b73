//! Storefront Persistence Layer
//!
//! This crate provides a generic data-access layer that persists arbitrary
//! entity types to either a document store or a wide-column (attribute scan)
//! store through one backend-agnostic interface.
//!
//! # Features
//!
//! - **Two Backends**: a document-store adapter and an attribute-scan adapter,
//!   each with an in-memory client and a feature-gated production client
//! - **Dynamic Filtering**: field-name/value predicates checked against a static
//!   entity schema, plus compile-time checked typed filters
//! - **Atomic Upsert**: single-call insert-or-replace on both backends
//! - **Optimistic Locking**: opt-in version field checked on write
//! - **Soft Delete**: stores that exclude flagged records on every read
//!
//! # Backend Features
//!
//! ```toml
//! [dependencies]
//! storefront-persistence = { version = "0.1", features = ["mongodb"] }
//! ```
//!
//! Available backend features:
//! - `mongodb` - MongoDB document storage via [`MongoDocumentClient`](backends::document::MongoDocumentClient)
//! - `dynamodb` - AWS DynamoDB via [`AwsDynamoDbClient`](backends::wide_column::AwsDynamoDbClient)
//!
//! The in-memory clients are always available.
//!
//! # Architecture
//!
//! - [`entity`] - The entity contract, field schema and validation
//! - [`types`] - Filters, pagination and record conversion
//! - [`request`] - Per-call cancellation, timeout and correlation id
//! - [`error`] - Error types for all operations
//! - [`core`] - The data context traits both adapters implement
//! - [`backends`] - The document-store and attribute-scan adapters
//! - [`repository`] - Generic repository with validation and update checks
//! - [`soft_delete`] - Stores that hide logically deleted records
//! - [`users`] - Authentication users and the user store
//! - [`config`] - Serde-deserializable backend and context configuration
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//!
//! use serde::{Deserialize, Serialize};
//! use storefront_persistence::backends::document::{DocumentContext, InMemoryDocumentStore};
//! use storefront_persistence::core::DataContext;
//! use storefront_persistence::entity::{Entity, Field, FieldDef, FieldKind};
//! use storefront_persistence::request::RequestContext;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Widget {
//!     id: String,
//!     name: String,
//!     price: f64,
//! }
//!
//! impl Widget {
//!     const NAME: Field<Widget, String> = Field::new("name");
//! }
//!
//! impl Entity for Widget {
//!     type Key = String;
//!     const ENTITY_NAME: &'static str = "Widget";
//!
//!     fn id(&self) -> &String {
//!         &self.id
//!     }
//!
//!     fn set_id(&mut self, id: String) {
//!         self.id = id;
//!     }
//!
//!     fn fields() -> &'static [FieldDef] {
//!         const FIELDS: &[FieldDef] = &[
//!             FieldDef::new("name", FieldKind::Text),
//!             FieldDef::new("price", FieldKind::Float),
//!         ];
//!         FIELDS
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let widgets = DocumentContext::<Widget>::new(store, "widgets");
//! let ctx = RequestContext::new();
//!
//! let widget = Widget { id: "abc".into(), name: "Widget".into(), price: 9.99 };
//! widgets.save(&ctx, &widget).await?;
//!
//! let found = widgets.find(&ctx, Widget::NAME.equals("Widget")).await?;
//! assert_eq!(found, vec![widget]);
//! # Ok::<(), storefront_persistence::StorageError>(())
//! # }).unwrap();
//! ```
//!
//! # Filter Policy
//!
//! String-keyed filters are checked against the entity schema. Under the
//! default [`FilterPolicy::Lenient`](types::FilterPolicy::Lenient) an unknown
//! or mistyped field is dropped (and logged), widening the result. Under
//! [`FilterPolicy::Strict`](types::FilterPolicy::Strict) the call fails with a
//! [`FilterError`](error::FilterError) before reaching the backend. Both
//! adapters apply the same policy.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod config;
pub mod core;
pub mod entity;
pub mod error;
pub mod repository;
pub mod request;
pub mod soft_delete;
pub mod types;
pub mod users;

// Re-export commonly used types
pub use error::{StorageError, StorageResult};
pub use request::RequestContext;
