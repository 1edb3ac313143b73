//! Soft deletion and the user store on both adapters.

mod common;

use std::sync::Arc;

use common::*;
use storefront_persistence::RequestContext;
use storefront_persistence::backends::document::{DocumentContext, InMemoryDocumentStore};
use storefront_persistence::backends::wide_column::{InMemoryWideColumnStore, ScanContext};
use storefront_persistence::config::TableConfig;
use storefront_persistence::core::DataContext;
use storefront_persistence::soft_delete::SoftDeleteStore;
use storefront_persistence::types::FilterSet;
use storefront_persistence::users::{AuthenticationUser, UserStore};

// ============================================================================
// SoftDeleteStore
// ============================================================================

#[tokio::test]
async fn test_deleted_records_are_hidden_from_every_read() {
    for (adapter, widgets) in contexts() {
        let store = SoftDeleteStore::new(widgets);
        let ctx = RequestContext::new();
        let set = widget_set();
        for widget in &set {
            store.save(&ctx, widget).await.unwrap();
        }

        let mut w2 = set[2].clone();
        store.delete(&ctx, &mut w2).await.unwrap();

        assert!(store.get(&ctx, &w2.id).await.unwrap().is_none(), "{adapter}");
        assert_eq!(store.get_all(&ctx).await.unwrap().len(), 9, "{adapter}");
        assert_eq!(
            store.filter(&ctx, "category_id", "cat1").await.unwrap().len(),
            4,
            "{adapter}"
        );
        let filters = FilterSet::new().with("name", "Widget 2");
        assert!(store.filter_many(&ctx, &filters).await.unwrap().is_empty(), "{adapter}");
        assert!(
            store
                .find(&ctx, Widget::NAME.equals("Widget 2"))
                .await
                .unwrap()
                .is_empty(),
            "{adapter}"
        );

        assert_eq!(
            store.get_all_including_deleted(&ctx).await.unwrap().len(),
            10,
            "{adapter}"
        );
        assert_eq!(
            store
                .filter_many_including_deleted(&ctx, &filters)
                .await
                .unwrap(),
            vec![w2.clone()],
            "{adapter}"
        );
    }
}

#[tokio::test]
async fn test_purge_removes_physically() {
    for (adapter, widgets) in contexts() {
        let store = SoftDeleteStore::new(widgets.clone());
        let ctx = RequestContext::new();
        let widget = Widget::new("p1", "Purged", 1.0);
        store.save(&ctx, &widget).await.unwrap();

        store.purge(&ctx, &widget).await.unwrap();
        assert!(widgets.get(&ctx, &widget.id).await.unwrap().is_none(), "{adapter}");
    }
}

// ============================================================================
// UserStore
// ============================================================================

fn document_users() -> UserStore<AuthenticationUser, DocumentContext<AuthenticationUser>> {
    let client = Arc::new(InMemoryDocumentStore::new());
    UserStore::new(DocumentContext::new(client, "users"))
}

fn scan_users() -> UserStore<AuthenticationUser, ScanContext<AuthenticationUser>> {
    let client = Arc::new(InMemoryWideColumnStore::new());
    client.create_table("users", "id");
    UserStore::new(ScanContext::new(client, TableConfig::new("users")))
}

#[tokio::test]
async fn test_user_store_on_document_adapter() {
    let users = document_users();
    let ctx = RequestContext::new();
    let mut kim = AuthenticationUser::new("kim@example.com", "hash-1");
    let lee = AuthenticationUser::new("lee@example.com", "hash-2").with_username("lee");
    users.save(&ctx, &kim).await.unwrap();
    users.save(&ctx, &lee).await.unwrap();

    assert_eq!(users.find_by_email(&ctx, "kim@example.com").await.unwrap(), Some(kim.clone()));
    assert_eq!(users.find_by_username(&ctx, "lee").await.unwrap(), Some(lee.clone()));

    users.delete(&ctx, &mut kim).await.unwrap();
    assert!(users.find_by_id(&ctx, &kim.id).await.unwrap().is_none());
    assert_eq!(users.filter(&ctx, "is_admin", false).await.unwrap(), vec![lee]);
}

#[tokio::test]
async fn test_user_store_on_scan_adapter() {
    let users = scan_users();
    let ctx = RequestContext::new();
    let mut admin = AuthenticationUser::new("root@example.com", "hash");
    admin.is_admin = true;
    admin.email_confirmed = true;
    admin.email_confirmation_token = Some("t-1".to_string());
    users.save(&ctx, &admin).await.unwrap();

    assert_eq!(users.find_by_id(&ctx, &admin.id).await.unwrap(), Some(admin.clone()));

    let filters = FilterSet::new()
        .with("is_admin", true)
        .with("email_confirmed", true);
    assert_eq!(users.filter_many(&ctx, &filters).await.unwrap(), vec![admin.clone()]);

    users.delete(&ctx, &mut admin).await.unwrap();
    assert!(users.filter_many(&ctx, &filters).await.unwrap().is_empty());
    assert!(users.find_by_email(&ctx, "root@example.com").await.unwrap().is_none());
}
