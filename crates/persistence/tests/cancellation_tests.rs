//! Cancellation, timeouts and surfaced backend failures.

mod common;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use common::*;
use storefront_persistence::RequestContext;
use storefront_persistence::backends::document::{DocumentContext, InMemoryDocumentStore};
use storefront_persistence::backends::wide_column::{
    IndexQuerySpec, InMemoryWideColumnStore, Item, PutCondition, ScanCondition, ScanContext,
    WideColumnApi, WideColumnClientError,
};
use storefront_persistence::config::ContextOptions;
use storefront_persistence::core::DataContext;
use storefront_persistence::error::{BackendError, StorageError};

/// Delays every call before delegating to an in-memory store.
struct SlowStore {
    inner: InMemoryWideColumnStore,
    delay: Duration,
}

impl SlowStore {
    fn new(delay: Duration) -> Self {
        let inner = InMemoryWideColumnStore::new();
        inner.create_table(WIDGETS, "id");
        Self { inner, delay }
    }
}

#[async_trait]
impl WideColumnApi for SlowStore {
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, WideColumnClientError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get_item(table, key).await
    }

    async fn scan(
        &self,
        table: &str,
        conditions: &[ScanCondition],
    ) -> Result<Vec<Item>, WideColumnClientError> {
        tokio::time::sleep(self.delay).await;
        self.inner.scan(table, conditions).await
    }

    async fn query(
        &self,
        table: &str,
        spec: &IndexQuerySpec,
    ) -> Result<Vec<Item>, WideColumnClientError> {
        tokio::time::sleep(self.delay).await;
        self.inner.query(table, spec).await
    }

    async fn put_item(
        &self,
        table: &str,
        item: Item,
        condition: Option<PutCondition>,
    ) -> Result<(), WideColumnClientError> {
        tokio::time::sleep(self.delay).await;
        self.inner.put_item(table, item, condition).await
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<(), WideColumnClientError> {
        tokio::time::sleep(self.delay).await;
        self.inner.delete_item(table, key).await
    }
}

fn slow_widgets(delay: Duration, options: ContextOptions) -> ScanContext<Widget> {
    ScanContext::new(Arc::new(SlowStore::new(delay)), widget_table()).with_options(options)
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancelled_request_never_reaches_backend() {
    for (adapter, widgets) in contexts() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = RequestContext::new().with_cancellation(token);

        let err = widgets
            .save(&ctx, &Widget::new("c1", "Cancelled", 1.0))
            .await
            .unwrap_err();
        assert!(
            matches!(err, StorageError::Backend(BackendError::Cancelled { ref operation }) if operation == "save"),
            "{adapter}: {err}"
        );

        let stored = widgets.get_all(&RequestContext::new()).await.unwrap();
        assert!(stored.is_empty(), "{adapter}");
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_in_flight_call() {
    let widgets = slow_widgets(Duration::from_secs(60), ContextOptions::default());
    let token = CancellationToken::new();
    let ctx = RequestContext::new().with_cancellation(token.clone());

    let canceller = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();
    });

    let err = widgets.get_all(&ctx).await.unwrap_err();
    assert!(matches!(err, StorageError::Backend(BackendError::Cancelled { .. })));
    canceller.await.unwrap();
}

// ============================================================================
// Timeouts
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_configured_timeout_applies() {
    let options = ContextOptions::default().with_operation_timeout(Duration::from_millis(500));
    let widgets = slow_widgets(Duration::from_secs(5), options);

    let err = widgets
        .get(&RequestContext::new(), &"w1".to_string())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Backend(BackendError::Timeout { timeout_ms: 500, .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_overrides_configured_one() {
    let options = ContextOptions::default().with_operation_timeout(Duration::from_millis(100));
    let widgets = slow_widgets(Duration::from_secs(1), options);

    let ctx = RequestContext::new().with_timeout(Duration::from_secs(10));
    widgets.save(&ctx, &Widget::new("w1", "Slow", 1.0)).await.unwrap();
    assert!(widgets.get(&ctx, &"w1".to_string()).await.unwrap().is_some());
}

// ============================================================================
// Backend failures
// ============================================================================

#[tokio::test]
async fn test_unavailable_store_is_surfaced() {
    let document_store = Arc::new(InMemoryDocumentStore::new());
    let documents: DocumentContext<Widget> = DocumentContext::new(document_store.clone(), WIDGETS);
    document_store.set_unavailable(true);

    let scan_store = Arc::new(InMemoryWideColumnStore::new());
    scan_store.create_table(WIDGETS, "id");
    let scans: ScanContext<Widget> = ScanContext::new(scan_store.clone(), widget_table());
    scan_store.set_unavailable(true);

    let ctx = RequestContext::new();
    for err in [
        documents.get_all(&ctx).await.unwrap_err(),
        scans.get_all(&ctx).await.unwrap_err(),
        documents.filter(&ctx, "name", "x".into()).await.unwrap_err(),
        scans.filter(&ctx, "name", "x".into()).await.unwrap_err(),
    ] {
        assert!(
            matches!(err, StorageError::Backend(BackendError::Unavailable { .. })),
            "{err}"
        );
    }
}
