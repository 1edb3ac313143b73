use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::client::{Document, DocumentApi, DocumentClientError, ReplaceOutcome};
use super::codec::ID_KEY;

/// A process-local document store.
///
/// Collections are created on first write. Every operation runs under one
/// lock, so `replace_one` with `upsert` is atomic like its server-side
/// counterpart. Filters support field equality (numbers compare by value) and
/// `$and`.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    unavailable: AtomicBool,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Returns the number of documents in a collection.
    pub fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(Vec::len)
            .unwrap_or(0)
    }

    fn check_available(&self) -> Result<(), DocumentClientError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(DocumentClientError::Unavailable(
                "in-memory document store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentApi for InMemoryDocumentStore {
    async fn find(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Vec<Document>, DocumentClientError> {
        self.check_available()?;
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| matches_filter(doc, filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<(), DocumentClientError> {
        self.check_available()?;
        let id = document_id(&document)?.clone();
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.iter().any(|doc| doc.get(ID_KEY) == Some(&id)) {
            return Err(DocumentClientError::DuplicateKey(format!(
                "duplicate _id {} in {}",
                id, collection
            )));
        }
        docs.push(document);
        Ok(())
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Document,
        mut replacement: Document,
        upsert: bool,
    ) -> Result<ReplaceOutcome, DocumentClientError> {
        self.check_available()?;
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = docs.iter_mut().find(|doc| matches_filter(doc, filter)) {
            let existing_id = existing.get(ID_KEY).cloned().unwrap_or(Value::Null);
            match replacement.get(ID_KEY) {
                Some(id) if *id != existing_id => {
                    return Err(DocumentClientError::InvalidInput(
                        "replacement would modify the immutable field _id".to_string(),
                    ));
                }
                Some(_) => {}
                None => {
                    replacement.insert(ID_KEY.to_string(), existing_id);
                }
            }
            *existing = replacement;
            return Ok(ReplaceOutcome {
                matched: 1,
                upserted: false,
            });
        }

        if !upsert {
            return Ok(ReplaceOutcome::default());
        }

        if !replacement.contains_key(ID_KEY) {
            match filter.get(ID_KEY) {
                Some(id) => {
                    replacement.insert(ID_KEY.to_string(), id.clone());
                }
                None => {
                    return Err(DocumentClientError::InvalidInput(
                        "upsert needs an _id in the filter or the replacement".to_string(),
                    ));
                }
            }
        }
        let id = document_id(&replacement)?;
        if docs.iter().any(|doc| doc.get(ID_KEY) == Some(id)) {
            return Err(DocumentClientError::DuplicateKey(format!(
                "duplicate _id {} in {}",
                id, collection
            )));
        }
        docs.push(replacement);
        Ok(ReplaceOutcome {
            matched: 0,
            upserted: true,
        })
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<u64, DocumentClientError> {
        self.check_available()?;
        let mut collections = self.collections.write();
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        match docs.iter().position(|doc| matches_filter(doc, filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

fn document_id(document: &Document) -> Result<&Value, DocumentClientError> {
    document
        .get(ID_KEY)
        .ok_or_else(|| DocumentClientError::InvalidInput("document has no _id".to_string()))
}

/// Evaluates an equality filter document against a stored document.
pub(crate) fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| {
        if key == "$and" {
            return match expected {
                Value::Array(clauses) => clauses.iter().all(|clause| match clause {
                    Value::Object(clause) => matches_filter(document, clause),
                    _ => false,
                }),
                _ => false,
            };
        }
        let actual = document.get(key).unwrap_or(&Value::Null);
        values_equal(actual, expected)
    })
}

fn values_equal(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => a == b,
        },
        _ => actual == expected,
    }
}
