//! Generic repository over a data context.
//!
//! [`Repository`] delegates to its [`DataContext`] and adds two things: every
//! write is validated first, and [`update`](Repository::update) refuses to
//! create a record that does not already exist.

use std::marker::PhantomData;

use crate::core::DataContext;
use crate::entity::{Entity, EntityKey, FieldValue, ensure_valid};
use crate::error::{ResourceError, StorageError, StorageResult};
use crate::request::RequestContext;
use crate::types::{Filter, FilterSet, Page};

/// Validated CRUD for entities of type `E`.
///
/// # Examples
///
/// ```ignore
/// let products = Repository::new(DocumentContext::<Product>::new(store, "products"));
/// products.add(&ctx, &product).await?;
///
/// product.price = 12.99;
/// products.update(&ctx, &product).await?;
/// ```
pub struct Repository<E, C> {
    context: C,
    _marker: PhantomData<fn() -> E>,
}

impl<E, C> Repository<E, C>
where
    E: Entity,
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

    /// Validates and stores a new entity.
    ///
    /// An existing record with the same identifier is overwritten.
    pub async fn add(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        ensure_valid(entity)?;
        self.context.save(ctx, entity).await
    }

    /// Reads one entity by identifier.
    pub async fn get(&self, ctx: &RequestContext, id: &E::Key) -> StorageResult<Option<E>> {
        self.context.get(ctx, id).await
    }

    /// Reads every entity.
    pub async fn get_all(&self, ctx: &RequestContext) -> StorageResult<Vec<E>> {
        self.context.get_all(ctx).await
    }

    /// Reads the entities whose `field` equals `value`.
    pub async fn filter(
        &self,
        ctx: &RequestContext,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> StorageResult<Vec<E>> {
        self.context.filter(ctx, field, value.into()).await
    }

    /// Reads the entities matching all `filters`.
    pub async fn filter_many(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
    ) -> StorageResult<Vec<E>> {
        self.context.filter_many(ctx, filters).await
    }

    /// Reads the entities matching a typed filter.
    pub async fn find(&self, ctx: &RequestContext, filter: Filter<E>) -> StorageResult<Vec<E>> {
        self.context.find(ctx, filter).await
    }

    /// Hard-deletes an entity.
    pub async fn remove(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        self.context.delete(ctx, entity).await
    }

    /// Validates and overwrites an existing entity.
    ///
    /// # Errors
    ///
    /// Returns `ResourceError::NotFound` without writing when no record has
    /// the entity's identifier.
    pub async fn update(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        ensure_valid(entity)?;

        if self.context.get(ctx, entity.id()).await?.is_none() {
            return Err(missing(entity));
        }

        self.context.save(ctx, entity).await
    }

    /// Reads every entity and returns one page of them.
    pub async fn page(
        &self,
        ctx: &RequestContext,
        page_index: usize,
        per_page: usize,
    ) -> StorageResult<Page<E>> {
        let items = self.context.get_all(ctx).await?;
        Page::paginate(items, page_index, per_page)
    }
}

/// The error for an update whose target record does not exist.
pub(crate) fn missing<E: Entity>(entity: &E) -> StorageError {
    let id = entity.id().to_field_value().to_string();
    tracing::debug!(entity = E::ENTITY_NAME, %id, "update of missing entity");
    ResourceError::NotFound {
        entity: E::ENTITY_NAME.to_string(),
        id,
    }
    .into()
}

impl<E, C: std::fmt::Debug> std::fmt::Debug for Repository<E, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("context", &self.context)
            .finish()
    }
}
