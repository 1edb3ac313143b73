use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

use super::client::{Document, DocumentApi, DocumentClientError, ReplaceOutcome};
use super::codec::{build_filter_document, from_document, id_filter, to_document};
use super::memory::{InMemoryDocumentStore, matches_filter};
use super::storage::DocumentContext;
use crate::config::ContextOptions;
use crate::core::{BackendCapability, BackendKind, DataContext, VersionedContext};
use crate::entity::{Entity, Field, FieldDef, FieldKind, Versioned};
use crate::error::{BackendError, ConcurrencyError, FilterError, ResourceError, StorageError};
use crate::request::RequestContext;
use crate::types::{FilterPolicy, FilterSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Gadget {
    id: String,
    name: String,
    price: f64,
    #[serde(default)]
    version: u64,
}

impl Gadget {
    const NAME: Field<Gadget, String> = Field::new("name");
    const PRICE: Field<Gadget, f64> = Field::new("price");

    fn new(id: &str, name: &str, price: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            price,
            version: 0,
        }
    }
}

impl Entity for Gadget {
    type Key = String;
    const ENTITY_NAME: &'static str = "Gadget";

    fn id(&self) -> &String {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn fields() -> &'static [FieldDef] {
        const FIELDS: &[FieldDef] = &[
            FieldDef::new("name", FieldKind::Text),
            FieldDef::new("price", FieldKind::Float),
            FieldDef::new("version", FieldKind::Integer),
        ];
        FIELDS
    }
}

impl Versioned for Gadget {
    fn version(&self) -> u64 {
        self.version
    }

    fn set_version(&mut self, version: u64) {
        self.version = version;
    }
}

/// Counts the calls that reach the store.
#[derive(Debug, Default)]
struct CountingClient {
    inner: InMemoryDocumentStore,
    calls: AtomicUsize,
}

impl CountingClient {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentApi for CountingClient {
    async fn find(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Vec<Document>, DocumentClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.find(collection, filter).await
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<(), DocumentClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.insert_one(collection, document).await
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Document,
        replacement: Document,
        upsert: bool,
    ) -> Result<ReplaceOutcome, DocumentClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .replace_one(collection, filter, replacement, upsert)
            .await
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<u64, DocumentClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_one(collection, filter).await
    }
}

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected a JSON object"),
    }
}

fn context(store: Arc<InMemoryDocumentStore>) -> DocumentContext<Gadget> {
    DocumentContext::new(store, "gadgets")
}

// ============================================================================
// Codec
// ============================================================================

#[test]
fn filter_document_maps_identifier_to_underscore_id() {
    let filters = FilterSet::new().with("id", "g1").with("name", "Lamp");
    let filter = build_filter_document::<Gadget>(&filters);
    assert_eq!(Value::Object(filter), json!({"_id": "g1", "name": "Lamp"}));
}

#[test]
fn filter_document_uses_and_for_repeated_fields() {
    let filters = FilterSet::new().with("name", "Lamp").with("name", "Desk");
    let filter = build_filter_document::<Gadget>(&filters);
    assert_eq!(
        Value::Object(filter),
        json!({"$and": [{"name": "Lamp"}, {"name": "Desk"}]})
    );
}

#[test]
fn filter_values_are_never_interpolated() {
    let filters = FilterSet::new().with("name", "'},{'$where':'1'");
    let filter = build_filter_document::<Gadget>(&filters);
    assert_eq!(filter.len(), 1);
    assert_eq!(filter["name"], json!("'},{'$where':'1'"));
}

#[test]
fn document_codec_moves_identifier() {
    let gadget = Gadget::new("g1", "Lamp", 12.5);
    let document = to_document(&gadget).unwrap();
    assert_eq!(document["_id"], json!("g1"));
    assert!(!document.contains_key("id"));
    assert_eq!(from_document::<Gadget>(document).unwrap(), gadget);
    assert_eq!(Value::Object(id_filter(&"g1".to_string())), json!({"_id": "g1"}));
}

#[test]
fn from_document_rejects_missing_identifier() {
    let err = from_document::<Gadget>(doc(json!({"name": "Lamp", "price": 1.0}))).unwrap_err();
    assert!(matches!(
        err,
        StorageError::Backend(BackendError::SerializationError { .. })
    ));
}

// ============================================================================
// In-memory store
// ============================================================================

#[test]
fn matcher_compares_numbers_by_value() {
    let stored = doc(json!({"_id": "a", "price": 10.0, "qty": 3}));
    assert!(matches_filter(&stored, &doc(json!({"price": 10}))));
    assert!(matches_filter(&stored, &doc(json!({"qty": 3.0}))));
    assert!(!matches_filter(&stored, &doc(json!({"qty": "3"}))));
}

#[test]
fn matcher_treats_missing_field_as_null() {
    let stored = doc(json!({"_id": "a"}));
    assert!(matches_filter(&stored, &doc(json!({"owner": null}))));
    assert!(!matches_filter(&stored, &doc(json!({"owner": "u1"}))));
}

#[tokio::test]
async fn memory_store_rejects_duplicate_insert() {
    let store = InMemoryDocumentStore::new();
    store
        .insert_one("c", doc(json!({"_id": "a", "n": 1})))
        .await
        .unwrap();
    let err = store
        .insert_one("c", doc(json!({"_id": "a", "n": 2})))
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentClientError::DuplicateKey(_)));
    assert_eq!(store.document_count("c"), 1);
}

#[tokio::test]
async fn memory_store_replace_keeps_identifier_immutable() {
    let store = InMemoryDocumentStore::new();
    store
        .insert_one("c", doc(json!({"_id": "a"})))
        .await
        .unwrap();
    let err = store
        .replace_one("c", &doc(json!({"_id": "a"})), doc(json!({"_id": "b"})), false)
        .await
        .unwrap_err();
    assert!(matches!(err, DocumentClientError::InvalidInput(_)));
}

#[tokio::test]
async fn memory_store_replace_without_upsert_matches_nothing() {
    let store = InMemoryDocumentStore::new();
    let outcome = store
        .replace_one("c", &doc(json!({"_id": "a"})), doc(json!({"_id": "a"})), false)
        .await
        .unwrap();
    assert_eq!(outcome, ReplaceOutcome::default());
    assert_eq!(store.document_count("c"), 0);
}

// ============================================================================
// DocumentContext
// ============================================================================

#[tokio::test]
async fn context_reports_kind_and_capabilities() {
    let gadgets = context(Arc::new(InMemoryDocumentStore::new()));
    assert_eq!(gadgets.backend_kind(), BackendKind::DocumentStore);
    assert!(gadgets.supports(BackendCapability::AtomicUpsert));
    assert!(!gadgets.supports(BackendCapability::IndexQuery));
    assert_eq!(gadgets.collection(), "gadgets");
}

#[tokio::test]
async fn save_upserts_a_single_document() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let gadgets = context(store.clone());
    let ctx = RequestContext::new();

    let mut gadget = Gadget::new("g1", "Lamp", 10.0);
    gadgets.save(&ctx, &gadget).await.unwrap();
    gadget.price = 11.0;
    gadgets.save(&ctx, &gadget).await.unwrap();

    assert_eq!(store.document_count("gadgets"), 1);
    let stored = gadgets.get(&ctx, &"g1".to_string()).await.unwrap();
    assert_eq!(stored, Some(gadget));
}

#[tokio::test]
async fn typed_find_matches_float_field() {
    let gadgets = context(Arc::new(InMemoryDocumentStore::new()));
    let ctx = RequestContext::new();
    gadgets.save(&ctx, &Gadget::new("g1", "Lamp", 10.0)).await.unwrap();
    gadgets.save(&ctx, &Gadget::new("g2", "Lamp", 20.0)).await.unwrap();

    let found = gadgets
        .find(&ctx, Gadget::NAME.equals("Lamp").and(Gadget::PRICE.equals(20.0)))
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, "g2");
}

#[tokio::test]
async fn strict_policy_fails_before_backend_call() {
    let client = Arc::new(CountingClient::default());
    let gadgets: DocumentContext<Gadget> = DocumentContext::new(client.clone(), "gadgets")
        .with_options(ContextOptions::default().with_filter_policy(FilterPolicy::Strict));
    let ctx = RequestContext::new();

    let err = gadgets
        .filter(&ctx, "colour", "red".into())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Filter(FilterError::UnknownField { .. })
    ));
    assert_eq!(client.calls(), 0);
}

#[tokio::test]
async fn lenient_policy_drops_mistyped_predicate() {
    let gadgets = context(Arc::new(InMemoryDocumentStore::new()));
    let ctx = RequestContext::new();
    gadgets.save(&ctx, &Gadget::new("g1", "Lamp", 10.0)).await.unwrap();
    gadgets.save(&ctx, &Gadget::new("g2", "Desk", 10.0)).await.unwrap();

    // integer value on a float field widens the query to everything
    let found = gadgets.filter(&ctx, "price", 99i64.into()).await.unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn unavailable_store_is_surfaced() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let gadgets = context(store.clone());
    store.set_unavailable(true);

    let err = gadgets
        .get_all(&RequestContext::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Backend(BackendError::Unavailable { .. })
    ));
}

#[tokio::test]
async fn cancelled_request_writes_nothing() {
    let client = Arc::new(CountingClient::default());
    let gadgets: DocumentContext<Gadget> = DocumentContext::new(client.clone(), "gadgets");
    let token = CancellationToken::new();
    token.cancel();
    let ctx = RequestContext::new().with_cancellation(token);

    let err = gadgets
        .save(&ctx, &Gadget::new("g1", "Lamp", 1.0))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Backend(BackendError::Cancelled { .. })
    ));
    assert_eq!(client.calls(), 0);
}

// ============================================================================
// Versioned saves
// ============================================================================

#[tokio::test]
async fn versioned_save_increments_version() {
    let gadgets = context(Arc::new(InMemoryDocumentStore::new()));
    let ctx = RequestContext::new();

    let mut gadget = Gadget::new("g1", "Lamp", 10.0);
    gadgets.save_versioned(&ctx, &mut gadget).await.unwrap();
    assert_eq!(gadget.version, 1);

    gadget.price = 12.0;
    gadgets.save_versioned(&ctx, &mut gadget).await.unwrap();
    assert_eq!(gadget.version, 2);

    let stored = gadgets.get(&ctx, &gadget.id).await.unwrap().unwrap();
    assert_eq!(stored.version, 2);
    assert_eq!(stored.price, 12.0);
}

#[tokio::test]
async fn versioned_save_detects_stale_writer() {
    let gadgets = context(Arc::new(InMemoryDocumentStore::new()));
    let ctx = RequestContext::new();

    let mut first = Gadget::new("g1", "Lamp", 10.0);
    gadgets.save_versioned(&ctx, &mut first).await.unwrap();
    let mut second = first.clone();

    first.price = 11.0;
    gadgets.save_versioned(&ctx, &mut first).await.unwrap();

    second.price = 9.0;
    let err = gadgets.save_versioned(&ctx, &mut second).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Concurrency(ConcurrencyError::VersionConflict {
            expected_version: 1,
            actual_version: Some(2),
            ..
        })
    ));
    assert_eq!(second.version, 1);
}

#[tokio::test]
async fn versioned_insert_conflicts_with_existing_record() {
    let gadgets = context(Arc::new(InMemoryDocumentStore::new()));
    let ctx = RequestContext::new();

    let mut stored = Gadget::new("g1", "Lamp", 10.0);
    gadgets.save_versioned(&ctx, &mut stored).await.unwrap();

    let mut fresh = Gadget::new("g1", "Other", 1.0);
    let err = gadgets.save_versioned(&ctx, &mut fresh).await.unwrap_err();
    assert!(err.is_conflict());
}

#[tokio::test]
async fn versioned_save_of_deleted_record_is_not_found() {
    let gadgets = context(Arc::new(InMemoryDocumentStore::new()));
    let ctx = RequestContext::new();

    let mut gadget = Gadget::new("g1", "Lamp", 10.0);
    gadgets.save_versioned(&ctx, &mut gadget).await.unwrap();
    gadgets.delete(&ctx, &gadget).await.unwrap();

    let err = gadgets.save_versioned(&ctx, &mut gadget).await.unwrap_err();
    assert!(matches!(
        err,
        StorageError::Resource(ResourceError::NotFound { .. })
    ));
}
