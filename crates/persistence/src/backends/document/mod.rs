//! Document-store adapter.
//!
//! Entities are stored as JSON documents, one collection per entity type,
//! with the identifier under `_id`. String-keyed filters are resolved against
//! the entity schema and turned into structured equality filter documents.
//! `save` is a single replace-with-upsert call.
//!
//! The adapter talks to the store through [`DocumentApi`]. Two clients ship
//! with the crate:
//!
//! - [`InMemoryDocumentStore`] - always available
//! - `MongoDocumentClient` - behind the `mongodb` feature

mod client;
mod codec;
mod memory;
#[cfg(feature = "mongodb")]
mod mongo;
mod storage;

pub use client::{Document, DocumentApi, DocumentClientError, ReplaceOutcome};
pub use codec::{ID_KEY, build_filter_document, id_filter};
pub use memory::InMemoryDocumentStore;
#[cfg(feature = "mongodb")]
pub use mongo::MongoDocumentClient;
pub use storage::DocumentContext;

#[cfg(test)]
mod tests;
