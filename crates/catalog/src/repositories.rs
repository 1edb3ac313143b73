//! Entity-specific repositories.
//!
//! Each wraps a generic store (reachable through `Deref`) and adds the
//! lookups the store front needs. Products are soft-deletable, so their
//! repository wraps a [`SoftDeleteStore`] and never returns deleted products.

use std::ops::Deref;

use storefront_persistence::StorageResult;
use storefront_persistence::config::{SecondaryIndex, TableConfig};
use storefront_persistence::core::{DataContext, IndexQuery};
use storefront_persistence::repository::Repository;
use storefront_persistence::request::RequestContext;
use storefront_persistence::soft_delete::SoftDeleteStore;
use storefront_persistence::types::{SortDirection, sort_by_field};
use storefront_persistence::users::UserStore;

use crate::models::{Category, Order, Picture, Product, User};

/// Secondary index on orders by user, newest last.
pub const USER_ORDERS_INDEX: &str = "UserOrdersIndex";

/// Table layout for orders on the attribute-scan adapter.
pub fn order_table(table_name: impl Into<String>) -> TableConfig {
    TableConfig::new(table_name)
        .with_index(SecondaryIndex::new(USER_ORDERS_INDEX, "user_id").with_sort_key("date_time"))
}

/// Categories need no lookups beyond the generic ones.
pub type CategoryRepository<C> = Repository<Category, C>;

/// Users, with soft deletion.
pub type UserRepository<C> = UserStore<User, C>;

macro_rules! repository_wrapper {
    ($name:ident, $store:ident, $entity:ty) => {
        impl<C: DataContext<$entity>> $name<C> {
            /// Wraps a data context.
            pub fn new(context: C) -> Self {
                Self {
                    inner: $store::new(context),
                }
            }
        }

        impl<C> Deref for $name<C> {
            type Target = $store<$entity, C>;

            fn deref(&self) -> &Self::Target {
                &self.inner
            }
        }
    };
}

/// Products, with soft deletion.
#[derive(Debug)]
pub struct ProductRepository<C> {
    inner: SoftDeleteStore<Product, C>,
}

repository_wrapper!(ProductRepository, SoftDeleteStore, Product);

impl<C: DataContext<Product>> ProductRepository<C> {
    /// Returns the products in a category.
    pub async fn by_category(
        &self,
        ctx: &RequestContext,
        category_id: &str,
    ) -> StorageResult<Vec<Product>> {
        self.inner
            .find(ctx, Product::CATEGORY_ID.equals(category_id))
            .await
    }
}

/// Pictures.
#[derive(Debug)]
pub struct PictureRepository<C> {
    inner: Repository<Picture, C>,
}

repository_wrapper!(PictureRepository, Repository, Picture);

impl<C: DataContext<Picture>> PictureRepository<C> {
    /// Returns the pictures attached to an entity.
    pub async fn by_entity(
        &self,
        ctx: &RequestContext,
        entity_id: &str,
    ) -> StorageResult<Vec<Picture>> {
        self.inner.filter(ctx, "entity_id", entity_id).await
    }
}

/// Orders.
#[derive(Debug)]
pub struct OrderRepository<C> {
    inner: Repository<Order, C>,
}

repository_wrapper!(OrderRepository, Repository, Order);

impl<C: DataContext<Order>> OrderRepository<C> {
    /// Returns a user's orders, newest first.
    ///
    /// Works on any adapter; on the attribute-scan adapter it scans the
    /// table, see [`history_for_user`](Self::history_for_user).
    pub async fn by_user(&self, ctx: &RequestContext, user_id: &str) -> StorageResult<Vec<Order>> {
        let mut orders = self.inner.find(ctx, Order::USER_ID.equals(user_id)).await?;
        sort_by_field(&mut orders, "date_time", SortDirection::Descending)?;
        Ok(orders)
    }
}

impl<C: IndexQuery<Order>> OrderRepository<C> {
    /// Returns a user's orders, newest first, through [`USER_ORDERS_INDEX`].
    pub async fn history_for_user(
        &self,
        ctx: &RequestContext,
        user_id: &str,
    ) -> StorageResult<Vec<Order>> {
        tracing::debug!(user_id, index = USER_ORDERS_INDEX, "order history query");
        self.inner
            .context()
            .query(ctx, user_id.into(), USER_ORDERS_INDEX, false)
            .await
    }
}
