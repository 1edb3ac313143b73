//! Logical deletion.
//!
//! A [`SoftDeleteStore`] never physically removes a [`SoftDeletable`] entity
//! on [`delete`](SoftDeleteStore::delete); it sets the deleted flag and saves.
//! Every read excludes flagged records: the store adds a `deleted == false`
//! predicate to the backend call and re-checks the flag on the results.
//! The `*_including_deleted` reads opt back in, and
//! [`purge`](SoftDeleteStore::purge) removes a record for good.

use std::marker::PhantomData;

use crate::core::DataContext;
use crate::entity::{Entity, FieldValue, ensure_valid};
use crate::error::StorageResult;
use crate::repository::missing;
use crate::request::RequestContext;
use crate::types::{Filter, FilterPolicy, FilterSet, Page, Predicate};

/// Entities that are deleted by flag rather than removed.
///
/// The deleted flag must be declared in [`Entity::fields`] as a boolean so
/// that typed reads can push it down to the backend.
pub trait SoftDeletable: Entity {
    /// The serialized name of the deleted flag.
    const DELETED_FIELD: &'static str = "is_deleted";

    /// Returns `true` if the entity is logically deleted.
    fn is_deleted(&self) -> bool;

    /// Sets or clears the deleted flag.
    fn set_deleted(&mut self, deleted: bool);
}

fn not_deleted<E: SoftDeletable>() -> Predicate {
    Predicate::new(E::DELETED_FIELD, false)
}

fn live<E: SoftDeletable>(mut items: Vec<E>) -> Vec<E> {
    items.retain(|item| !item.is_deleted());
    items
}

/// A data context wrapper that hides logically deleted records.
pub struct SoftDeleteStore<E, C> {
    context: C,
    _marker: PhantomData<fn() -> E>,
}

impl<E, C> SoftDeleteStore<E, C>
where
    E: SoftDeletable,
    C: DataContext<E>,
{
    /// Wraps a data context.
    pub fn new(context: C) -> Self {
        Self {
            context,
            _marker: PhantomData,
        }
    }

    /// Returns the underlying context.
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Reads one entity by identifier, unless it is deleted.
    pub async fn get(&self, ctx: &RequestContext, id: &E::Key) -> StorageResult<Option<E>> {
        Ok(self
            .context
            .get(ctx, id)
            .await?
            .filter(|item| !item.is_deleted()))
    }

    /// Reads one entity by identifier, deleted or not.
    pub async fn get_including_deleted(
        &self,
        ctx: &RequestContext,
        id: &E::Key,
    ) -> StorageResult<Option<E>> {
        self.context.get(ctx, id).await
    }

    /// Reads every entity that is not deleted.
    pub async fn get_all(&self, ctx: &RequestContext) -> StorageResult<Vec<E>> {
        self.filter_many(ctx, &FilterSet::new()).await
    }

    /// Reads every entity, deleted or not.
    pub async fn get_all_including_deleted(&self, ctx: &RequestContext) -> StorageResult<Vec<E>> {
        self.context.get_all(ctx).await
    }

    /// Reads the live entities whose `field` equals `value`.
    pub async fn filter(
        &self,
        ctx: &RequestContext,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> StorageResult<Vec<E>> {
        self.filter_many(ctx, &FilterSet::new().with(field, value))
            .await
    }

    /// Reads the entities, deleted or not, whose `field` equals `value`.
    pub async fn filter_including_deleted(
        &self,
        ctx: &RequestContext,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> StorageResult<Vec<E>> {
        self.context.filter(ctx, field, value.into()).await
    }

    /// Reads the live entities matching all `filters`.
    pub async fn filter_many(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
    ) -> StorageResult<Vec<E>> {
        self.filter_many_with_policy(ctx, filters, self.context.filter_policy())
            .await
    }

    /// Reads the live entities matching all `filters` under an explicit
    /// filter policy.
    pub async fn filter_many_with_policy(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
        policy: FilterPolicy,
    ) -> StorageResult<Vec<E>> {
        let mut filters = filters.clone();
        filters.push(not_deleted::<E>());
        let items = self
            .context
            .filter_with_policy(ctx, &filters, policy)
            .await?;
        Ok(live(items))
    }

    /// Reads the entities, deleted or not, matching all `filters`.
    pub async fn filter_many_including_deleted(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
    ) -> StorageResult<Vec<E>> {
        self.context.filter_many(ctx, filters).await
    }

    /// Reads the live entities matching a typed filter.
    pub async fn find(&self, ctx: &RequestContext, filter: Filter<E>) -> StorageResult<Vec<E>> {
        let filter = filter.and(Filter::from(not_deleted::<E>()));
        let items = self.context.find(ctx, filter).await?;
        Ok(live(items))
    }

    /// Reads the live entities and returns one page of them.
    pub async fn page(
        &self,
        ctx: &RequestContext,
        page_index: usize,
        per_page: usize,
    ) -> StorageResult<Page<E>> {
        let items = self.get_all(ctx).await?;
        Page::paginate(items, page_index, per_page)
    }

    /// Validates and stores a new entity.
    pub async fn add(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        ensure_valid(entity)?;
        self.context.save(ctx, entity).await
    }

    /// Validates and overwrites a live entity.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::NotFound` without writing when no live record
    /// has the entity's identifier. Deleted records come back through
    /// [`restore`](Self::restore).
    pub async fn update(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        ensure_valid(entity)?;
        if self.get(ctx, entity.id()).await?.is_none() {
            return Err(missing(entity));
        }
        self.context.save(ctx, entity).await
    }

    /// Inserts or replaces an entity.
    pub async fn save(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        self.context.save(ctx, entity).await
    }

    /// Flags `entity` as deleted and saves it.
    pub async fn delete(&self, ctx: &RequestContext, entity: &mut E) -> StorageResult<()> {
        entity.set_deleted(true);
        self.context.save(ctx, entity).await?;
        tracing::debug!(entity = E::ENTITY_NAME, id = ?entity.id(), "entity soft-deleted");
        Ok(())
    }

    /// Clears the deleted flag and saves the entity.
    pub async fn restore(&self, ctx: &RequestContext, entity: &mut E) -> StorageResult<()> {
        entity.set_deleted(false);
        self.context.save(ctx, entity).await
    }

    /// Physically removes an entity.
    pub async fn purge(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        self.context.delete(ctx, entity).await
    }
}

impl<E, C: std::fmt::Debug> std::fmt::Debug for SoftDeleteStore<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftDeleteStore")
            .field("context", &self.context)
            .finish()
    }
}
