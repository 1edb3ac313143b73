//! The unified data context trait.
//!
//! [`DataContext`] binds one entity type to one physical collection or table.
//! Both adapters implement it, so everything above this layer is
//! backend-agnostic. Every operation takes a [`RequestContext`] first.

use std::sync::Arc;

use async_trait::async_trait;

use super::backend::{BackendCapability, BackendKind};
use crate::entity::{Entity, FieldValue};
use crate::error::StorageResult;
use crate::request::RequestContext;
use crate::types::{Filter, FilterPolicy, FilterSet};

/// Get, list, filter, upsert and delete for entities of type `E`.
///
/// # Not Found
///
/// A missing record is `Ok(None)` from [`get`](Self::get) and an unmatched
/// filter is an empty `Vec`. Errors are reserved for invalid requests and
/// backend failures.
///
/// # Filtering
///
/// [`filter`](Self::filter) and [`filter_many`](Self::filter_many) take
/// string-keyed predicates and apply the context's [`FilterPolicy`].
/// [`find`](Self::find) takes a typed filter and always applies
/// [`FilterPolicy::Strict`], since a bad field there is a programming error.
/// An empty filter set matches every record.
///
/// # Example
///
/// ```ignore
/// use storefront_persistence::core::DataContext;
/// use storefront_persistence::request::RequestContext;
///
/// async fn restock<C: DataContext<Product>>(products: &C) -> StorageResult<()> {
///     let ctx = RequestContext::new();
///     for mut product in products.filter(&ctx, "is_available", false.into()).await? {
///         product.is_available = true;
///         products.save(&ctx, &product).await?;
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait DataContext<E: Entity>: Send + Sync {
    /// Returns the kind of store behind this context.
    fn backend_kind(&self) -> BackendKind;

    /// Returns the capabilities of this context.
    fn capabilities(&self) -> &'static [BackendCapability];

    /// Returns `true` if this context supports `capability`.
    fn supports(&self, capability: BackendCapability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Returns the policy applied to string-keyed filters.
    fn filter_policy(&self) -> FilterPolicy;

    /// Reads the record with the given identifier.
    async fn get(&self, ctx: &RequestContext, id: &E::Key) -> StorageResult<Option<E>>;

    /// Reads every record. There is no paging at this layer.
    async fn get_all(&self, ctx: &RequestContext) -> StorageResult<Vec<E>>;

    /// Reads the records matching all `filters` under an explicit policy.
    async fn filter_with_policy(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
        policy: FilterPolicy,
    ) -> StorageResult<Vec<E>>;

    /// Reads the records whose `field` equals `value`.
    async fn filter(
        &self,
        ctx: &RequestContext,
        field: &str,
        value: FieldValue,
    ) -> StorageResult<Vec<E>> {
        let filters = FilterSet::new().with(field, value);
        self.filter_with_policy(ctx, &filters, self.filter_policy())
            .await
    }

    /// Reads the records matching all `filters`.
    async fn filter_many(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
    ) -> StorageResult<Vec<E>> {
        self.filter_with_policy(ctx, filters, self.filter_policy())
            .await
    }

    /// Reads the records matching a typed filter.
    async fn find(&self, ctx: &RequestContext, filter: Filter<E>) -> StorageResult<Vec<E>> {
        self.filter_with_policy(ctx, filter.as_set(), FilterPolicy::Strict)
            .await
    }

    /// Inserts or replaces the whole record.
    async fn save(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()>;

    /// Removes the record with the entity's identifier. Removing a missing
    /// record is not an error.
    async fn delete(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()>;
}

#[async_trait]
impl<E, C> DataContext<E> for Arc<C>
where
    E: Entity,
    C: DataContext<E> + ?Sized,
{
    fn backend_kind(&self) -> BackendKind {
        (**self).backend_kind()
    }

    fn capabilities(&self) -> &'static [BackendCapability] {
        (**self).capabilities()
    }

    fn filter_policy(&self) -> FilterPolicy {
        (**self).filter_policy()
    }

    async fn get(&self, ctx: &RequestContext, id: &E::Key) -> StorageResult<Option<E>> {
        (**self).get(ctx, id).await
    }

    async fn get_all(&self, ctx: &RequestContext) -> StorageResult<Vec<E>> {
        (**self).get_all(ctx).await
    }

    async fn filter_with_policy(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
        policy: FilterPolicy,
    ) -> StorageResult<Vec<E>> {
        (**self).filter_with_policy(ctx, filters, policy).await
    }

    async fn save(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        (**self).save(ctx, entity).await
    }

    async fn delete(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        (**self).delete(ctx, entity).await
    }
}
