//! Version-checked saves.

use std::sync::Arc;

use async_trait::async_trait;

use super::context::DataContext;
use crate::entity::Versioned;
use crate::error::StorageResult;
use crate::request::RequestContext;

/// Optimistic concurrency on top of [`DataContext`].
///
/// Plain [`DataContext::save`] is last-write-wins. `save_versioned` writes
/// only when the stored version still equals the entity's version:
///
/// * version `0` inserts, and fails if the identifier is already taken
/// * version `n > 0` replaces, and fails if the stored version is not `n`
///
/// On success the stored record and `entity` both carry version `n + 1`.
///
/// # Errors
///
/// * `ConcurrencyError::VersionConflict` - another writer got there first
/// * `ResourceError::NotFound` - a version `n > 0` was given for a record that
///   no longer exists
#[async_trait]
pub trait VersionedContext<E: Versioned>: DataContext<E> {
    /// Saves `entity` if nobody else has written it since it was read.
    async fn save_versioned(&self, ctx: &RequestContext, entity: &mut E) -> StorageResult<()>;
}

#[async_trait]
impl<E, C> VersionedContext<E> for Arc<C>
where
    E: Versioned,
    C: VersionedContext<E> + ?Sized,
{
    async fn save_versioned(&self, ctx: &RequestContext, entity: &mut E) -> StorageResult<()> {
        (**self).save_versioned(ctx, entity).await
    }
}
