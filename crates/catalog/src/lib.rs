//! Storefront Catalog
//!
//! Domain models of the online store (products, categories, orders,
//! pictures and users) and the repositories the store front uses to load
//! them. Everything persists through `storefront-persistence`, so each
//! repository works on either backend.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use storefront_catalog::models::Product;
//! use storefront_catalog::repositories::ProductRepository;
//! use storefront_persistence::RequestContext;
//! use storefront_persistence::backends::document::{DocumentContext, InMemoryDocumentStore};
//!
//! # tokio_test::block_on(async {
//! let store = Arc::new(InMemoryDocumentStore::new());
//! let products = ProductRepository::new(DocumentContext::new(store, "products"));
//! let ctx = RequestContext::new();
//!
//! let lamp = Product::new("Lamp", "A desk lamp", 24.5, "lighting").with_availability(3);
//! products.add(&ctx, &lamp).await?;
//!
//! assert_eq!(products.by_category(&ctx, "lighting").await?, vec![lamp]);
//! # Ok::<(), storefront_persistence::StorageError>(())
//! # }).unwrap();
//! ```

pub mod models;
pub mod repositories;
