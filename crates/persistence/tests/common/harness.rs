//! Context construction for both adapters.

use std::sync::Arc;

use storefront_persistence::RequestContext;
use storefront_persistence::backends::document::{DocumentContext, InMemoryDocumentStore};
use storefront_persistence::backends::wide_column::{InMemoryWideColumnStore, ScanContext};
use storefront_persistence::config::{ContextOptions, SecondaryIndex, TableConfig};
use storefront_persistence::core::{DataContext, VersionedContext};
use storefront_persistence::types::FilterPolicy;

use super::fixtures::Widget;

pub const WIDGETS: &str = "widgets";
pub const CATEGORY_INDEX: &str = "CategoryIndex";

/// A widget context on one adapter.
pub type WidgetContext = Arc<dyn VersionedContext<Widget>>;

/// The widget table layout, with a category index sorted by creation time.
pub fn widget_table() -> TableConfig {
    TableConfig::new(WIDGETS)
        .with_index(SecondaryIndex::new(CATEGORY_INDEX, "category_id").with_sort_key("created_at"))
}

/// A document-store widget context on a fresh in-memory store.
pub fn document_widgets(options: ContextOptions) -> DocumentContext<Widget> {
    let store = Arc::new(InMemoryDocumentStore::new());
    DocumentContext::new(store, WIDGETS).with_options(options)
}

/// An attribute-scan widget context on a fresh in-memory store.
pub fn scan_widgets(options: ContextOptions) -> ScanContext<Widget> {
    let store = Arc::new(InMemoryWideColumnStore::new());
    store.create_table(WIDGETS, "id");
    ScanContext::new(store, widget_table()).with_options(options)
}

/// One fresh widget context per adapter, named for assertion messages.
pub fn contexts_with(options: ContextOptions) -> Vec<(&'static str, WidgetContext)> {
    let document: WidgetContext = Arc::new(document_widgets(options.clone()));
    let wide_column: WidgetContext = Arc::new(scan_widgets(options));
    vec![("document", document), ("wide-column", wide_column)]
}

/// One fresh widget context per adapter with default options.
pub fn contexts() -> Vec<(&'static str, WidgetContext)> {
    contexts_with(ContextOptions::default())
}

/// One fresh widget context per adapter under the strict filter policy.
pub fn strict_contexts() -> Vec<(&'static str, WidgetContext)> {
    contexts_with(ContextOptions::default().with_filter_policy(FilterPolicy::Strict))
}

/// Saves every widget.
pub async fn seed<C: DataContext<Widget> + ?Sized>(context: &C, widgets: &[Widget]) {
    let ctx = RequestContext::new();
    for widget in widgets {
        context.save(&ctx, widget).await.unwrap();
    }
}
