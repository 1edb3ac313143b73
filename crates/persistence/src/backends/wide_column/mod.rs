//! Attribute-scan adapter.
//!
//! Entities are stored as items in a wide-column table keyed by the entity's
//! identifier. String-keyed filters are resolved against the entity schema
//! and evaluated as scan conditions against every item; `get_all` is an
//! unconditioned scan and is expensive on large tables. Secondary indexes
//! declared in [`TableConfig`](crate::config::TableConfig) give a key-based
//! query path through [`IndexQuery`](crate::core::IndexQuery).
//!
//! The adapter talks to the store through [`WideColumnApi`]. Two clients ship
//! with the crate:
//!
//! - [`InMemoryWideColumnStore`] - always available
//! - `AwsDynamoDbClient` - behind the `dynamodb` feature

mod client;
#[cfg(feature = "dynamodb")]
mod dynamodb;
mod memory;
mod storage;

pub use client::{
    AttributeValue, IndexQuerySpec, Item, PutCondition, ScanCondition, ScanOperator,
    WideColumnApi, WideColumnClientError, item_from_record, item_to_record,
};
#[cfg(feature = "dynamodb")]
pub use dynamodb::AwsDynamoDbClient;
pub use memory::InMemoryWideColumnStore;
pub use storage::ScanContext;
