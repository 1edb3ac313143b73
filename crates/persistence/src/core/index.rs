//! Secondary index queries.

use std::sync::Arc;

use async_trait::async_trait;

use super::context::DataContext;
use crate::entity::{Entity, FieldValue};
use crate::error::StorageResult;
use crate::request::RequestContext;

/// Equality lookup on the hash key of a named secondary index.
///
/// This is the non-scan fast path of stores that maintain secondary indexes.
/// Results come back ordered by the index's sort key in the requested
/// direction.
///
/// # Errors
///
/// * `FilterError::MissingIndexName` - if `index_name` is blank
/// * `FilterError::UnknownIndex` - if the index is not declared for the table
/// * `FilterError::TypeMismatch` - if `hash_key_value` does not have the
///   declared kind of the index's hash key
#[async_trait]
pub trait IndexQuery<E: Entity>: DataContext<E> {
    /// Returns every record whose index hash key equals `hash_key_value`.
    async fn query(
        &self,
        ctx: &RequestContext,
        hash_key_value: FieldValue,
        index_name: &str,
        sort_ascending: bool,
    ) -> StorageResult<Vec<E>>;
}

#[async_trait]
impl<E, C> IndexQuery<E> for Arc<C>
where
    E: Entity,
    C: IndexQuery<E> + ?Sized,
{
    async fn query(
        &self,
        ctx: &RequestContext,
        hash_key_value: FieldValue,
        index_name: &str,
        sort_ascending: bool,
    ) -> StorageResult<Vec<E>> {
        (**self)
            .query(ctx, hash_key_value, index_name, sort_ascending)
            .await
    }
}
