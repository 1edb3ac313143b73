use crate::core::DataContext;
use crate::entity::{FieldValue, ensure_valid};
use crate::error::StorageResult;
use crate::request::RequestContext;
use crate::soft_delete::SoftDeleteStore;
use crate::types::{FilterPolicy, FilterSet};

use super::user::UserEntity;

/// Persistence for users.
///
/// Deletion is logical and every lookup skips deleted users.
#[derive(Debug)]
pub struct UserStore<U, C> {
    inner: SoftDeleteStore<U, C>,
}

impl<U, C> UserStore<U, C>
where
    U: UserEntity,
    C: DataContext<U>,
{
    /// Wraps a data context.
    pub fn new(context: C) -> Self {
        Self {
            inner: SoftDeleteStore::new(context),
        }
    }

    /// Returns the soft-delete view, for reads that include deleted users.
    pub fn soft_delete(&self) -> &SoftDeleteStore<U, C> {
        &self.inner
    }

    /// Finds a user by identifier.
    pub async fn find_by_id(&self, ctx: &RequestContext, id: &U::Key) -> StorageResult<Option<U>> {
        self.inner.get(ctx, id).await
    }

    /// Finds a user by exact email address.
    pub async fn find_by_email(&self, ctx: &RequestContext, email: &str) -> StorageResult<Option<U>> {
        self.first(ctx, U::EMAIL_FIELD, email).await
    }

    /// Finds a user by exact username.
    pub async fn find_by_username(
        &self,
        ctx: &RequestContext,
        username: &str,
    ) -> StorageResult<Option<U>> {
        self.first(ctx, U::USERNAME_FIELD, username).await
    }

    /// Reads the users whose `field` equals `value`.
    pub async fn filter(
        &self,
        ctx: &RequestContext,
        field: &str,
        value: impl Into<FieldValue>,
    ) -> StorageResult<Vec<U>> {
        self.inner.filter(ctx, field, value).await
    }

    /// Reads the users matching all `filters`.
    pub async fn filter_many(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
    ) -> StorageResult<Vec<U>> {
        self.inner.filter_many(ctx, filters).await
    }

    /// Validates and creates or replaces a user.
    pub async fn save(&self, ctx: &RequestContext, user: &U) -> StorageResult<()> {
        ensure_valid(user)?;
        self.inner.save(ctx, user).await
    }

    /// Marks a user as deleted.
    pub async fn delete(&self, ctx: &RequestContext, user: &mut U) -> StorageResult<()> {
        self.inner.delete(ctx, user).await
    }

    /// Identity lookups never widen: an undeclared field is an error.
    async fn first(
        &self,
        ctx: &RequestContext,
        field: &str,
        value: &str,
    ) -> StorageResult<Option<U>> {
        let filters = FilterSet::new().with(field, value);
        let mut users = self
            .inner
            .filter_many_with_policy(ctx, &filters, FilterPolicy::Strict)
            .await?;
        if users.len() > 1 {
            tracing::warn!(field, matches = users.len(), "user lookup matched several users");
        }
        Ok(if users.is_empty() {
            None
        } else {
            Some(users.swap_remove(0))
        })
    }
}
