//! Shared construction of catalog repositories over in-memory stores.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use storefront_catalog::models::{Order, OrderItem, Product};
use storefront_catalog::repositories::order_table;
use storefront_persistence::backends::document::{DocumentContext, InMemoryDocumentStore};
use storefront_persistence::backends::wide_column::{InMemoryWideColumnStore, ScanContext};
use storefront_persistence::config::TableConfig;
use storefront_persistence::entity::Entity;

/// A document context on a fresh in-memory store.
pub fn document<E: Entity>(collection: &str) -> DocumentContext<E> {
    DocumentContext::new(Arc::new(InMemoryDocumentStore::new()), collection)
}

/// An attribute-scan context on a fresh in-memory store.
pub fn scan<E: Entity>(table: TableConfig) -> ScanContext<E> {
    let store = Arc::new(InMemoryWideColumnStore::new());
    store.create_table(&table.table_name, E::ID_FIELD);
    ScanContext::new(store, table)
}

/// An attribute-scan order context with the user index declared.
pub fn scan_orders() -> ScanContext<Order> {
    scan(order_table("orders"))
}

pub fn product(name: &str, category_id: &str) -> Product {
    Product::new(name, "A fine product", 10.0, category_id).with_availability(5)
}

/// An order by `user_id` placed `minutes` after a fixed instant.
pub fn order(user_id: &str, minutes: i64) -> Order {
    let mut order = Order::new(
        "browser-1",
        "Kim Lee",
        "+1 555 0100",
        "1 Main St",
        vec![OrderItem {
            product: product("Lamp", "lighting"),
            count: 2,
        }],
    )
    .for_user(user_id);
    order.date_time = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes);
    order
}
