//! Secondary index queries on the attribute-scan adapter.

mod common;

use common::*;
use storefront_persistence::RequestContext;
use storefront_persistence::config::ContextOptions;
use storefront_persistence::core::{DataContext, IndexQuery};
use storefront_persistence::error::{FilterError, StorageError};
use storefront_persistence::types::{SortDirection, sort_by_field};

fn five_in_cat1() -> Vec<Widget> {
    [30, 10, 50, 20, 40]
        .into_iter()
        .enumerate()
        .map(|(i, minutes)| {
            Widget::new(&format!("c{i}"), "Indexed", 5.0)
                .in_category("cat1")
                .created_minutes_after_epoch(minutes)
        })
        .collect()
}

#[tokio::test]
async fn test_query_descending_returns_all_newest_first() {
    let widgets = scan_widgets(ContextOptions::default());
    seed(&widgets, &five_in_cat1()).await;
    seed(&widgets, &[Widget::new("other", "Other", 1.0).in_category("cat2")]).await;

    let found = widgets
        .query(&RequestContext::new(), "cat1".into(), CATEGORY_INDEX, false)
        .await
        .unwrap();

    let minutes: Vec<_> = found
        .iter()
        .map(|w| (w.created_at - epoch()).num_minutes())
        .collect();
    assert_eq!(minutes, vec![50, 40, 30, 20, 10]);
}

#[tokio::test]
async fn test_query_orders_mixed_precision_timestamps() {
    let widgets = scan_widgets(ContextOptions::default());
    let mut whole = Widget::new("whole", "Whole second", 5.0).in_category("cat1");
    whole.created_at = epoch();
    let mut half = Widget::new("half", "Half second", 5.0).in_category("cat1");
    half.created_at = epoch() + chrono::Duration::milliseconds(500);
    let mut nanos = Widget::new("nanos", "Nanoseconds", 5.0).in_category("cat1");
    nanos.created_at = epoch() + chrono::Duration::nanoseconds(123_456_789);
    let mut millis = Widget::new("millis", "Milliseconds", 5.0).in_category("cat1");
    millis.created_at = epoch() + chrono::Duration::milliseconds(123);
    seed(&widgets, &[whole, half, nanos, millis]).await;

    let mut found = widgets
        .query(&RequestContext::new(), "cat1".into(), CATEGORY_INDEX, false)
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|w| w.id.clone()).collect();
    assert_eq!(ids, vec!["half", "nanos", "millis", "whole"]);

    found.reverse();
    assert!(sort_by_field(&mut found, "created_at", SortDirection::Descending).unwrap());
    let ids: Vec<_> = found.iter().map(|w| w.id.clone()).collect();
    assert_eq!(ids, vec!["half", "nanos", "millis", "whole"]);

    let exact = widgets
        .find(&RequestContext::new(), Widget::CREATED_AT.equals(epoch()))
        .await
        .unwrap();
    assert_eq!(exact.len(), 1);
    assert_eq!(exact[0].id, "whole");
}

#[tokio::test]
async fn test_query_ascending() {
    let widgets = scan_widgets(ContextOptions::default());
    seed(&widgets, &five_in_cat1()).await;

    let found = widgets
        .query(&RequestContext::new(), "cat1".into(), CATEGORY_INDEX, true)
        .await
        .unwrap();
    let ids: Vec<_> = found.iter().map(|w| w.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c3", "c0", "c4", "c2"]);
}

#[tokio::test]
async fn test_query_unknown_hash_key_is_empty() {
    let widgets = scan_widgets(ContextOptions::default());
    seed(&widgets, &five_in_cat1()).await;

    let found = widgets
        .query(&RequestContext::new(), "cat9".into(), CATEGORY_INDEX, true)
        .await
        .unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_query_matches_filter_results() {
    let widgets = scan_widgets(ContextOptions::default());
    let ctx = RequestContext::new();
    seed(&widgets, &widget_set()).await;

    let queried = widgets
        .query(&ctx, "cat2".into(), CATEGORY_INDEX, true)
        .await
        .unwrap();
    let filtered = widgets
        .filter(&ctx, "category_id", "cat2".into())
        .await
        .unwrap();
    assert_eq!(sorted(queried), sorted(filtered));
}

#[tokio::test]
async fn test_query_requires_index_name() {
    let widgets = scan_widgets(ContextOptions::default());
    for blank in ["", "   "] {
        let err = widgets
            .query(&RequestContext::new(), "cat1".into(), blank, false)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Filter(FilterError::MissingIndexName)));
    }
}

#[tokio::test]
async fn test_query_rejects_undeclared_index() {
    let widgets = scan_widgets(ContextOptions::default());
    let err = widgets
        .query(&RequestContext::new(), "cat1".into(), "PriceIndex", false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::Filter(FilterError::UnknownIndex { ref table, .. }) if table == WIDGETS
    ));
}

#[tokio::test]
async fn test_query_rejects_mistyped_hash_key() {
    let widgets = scan_widgets(ContextOptions::default());
    let err = widgets
        .query(&RequestContext::new(), true.into(), CATEGORY_INDEX, false)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Filter(FilterError::TypeMismatch { .. })));
}
