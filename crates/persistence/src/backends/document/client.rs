use async_trait::async_trait;
use serde_json::{Map, Value};

/// A stored document: a JSON object keyed by `_id`.
pub type Document = Map<String, Value>;

/// Result of a replace call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaceOutcome {
    /// Number of documents that matched the filter.
    pub matched: u64,
    /// Whether a new document was inserted.
    pub upserted: bool,
}

/// Failures reported by a document store client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentClientError {
    /// A document with the same `_id` already exists.
    DuplicateKey(String),
    /// The store could not be reached.
    Unavailable(String),
    /// The store rejected the request.
    InvalidInput(String),
    /// Any other failure.
    Internal(String),
}

/// The document collection operations the adapter needs.
#[async_trait]
pub trait DocumentApi: Send + Sync {
    /// Returns every document matching `filter`.
    async fn find(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Vec<Document>, DocumentClientError>;

    /// Inserts a document, failing on a duplicate `_id`.
    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<(), DocumentClientError>;

    /// Replaces the first document matching `filter`, inserting `replacement`
    /// when nothing matches and `upsert` is set. Atomic per document.
    async fn replace_one(
        &self,
        collection: &str,
        filter: &Document,
        replacement: Document,
        upsert: bool,
    ) -> Result<ReplaceOutcome, DocumentClientError>;

    /// Deletes the first document matching `filter` and returns the count.
    async fn delete_one(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<u64, DocumentClientError>;
}
