use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use super::client::{Document, DocumentApi, DocumentClientError};
use super::codec::{build_filter_document, from_document, id_filter, to_document};
use crate::config::ContextOptions;
use crate::core::{BackendCapability, BackendKind, DataContext, VersionedContext};
use crate::entity::{Entity, EntityKey, Versioned};
use crate::error::{BackendError, ConcurrencyError, ResourceError, StorageError, StorageResult};
use crate::request::RequestContext;
use crate::types::{FilterPolicy, FilterSet, resolve};

fn display_id<K: EntityKey>(id: &K) -> String {
    id.to_field_value().to_string()
}

const CAPABILITIES: &[BackendCapability] = &[
    BackendCapability::Crud,
    BackendCapability::DynamicFilter,
    BackendCapability::AtomicUpsert,
    BackendCapability::OptimisticLocking,
];

/// A [`DataContext`] over one document collection.
pub struct DocumentContext<E> {
    client: Arc<dyn DocumentApi>,
    collection: String,
    options: ContextOptions,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> DocumentContext<E> {
    /// Binds entity type `E` to `collection` with default options.
    pub fn new(client: Arc<dyn DocumentApi>, collection: impl Into<String>) -> Self {
        Self {
            client,
            collection: collection.into(),
            options: ContextOptions::default(),
            _marker: PhantomData,
        }
    }

    /// Replaces the context options.
    pub fn with_options(mut self, options: ContextOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the collection name.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Returns the context options.
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    fn map_client_error(&self, err: DocumentClientError, id: Option<&E::Key>) -> StorageError {
        let backend_name = BackendKind::DocumentStore.to_string();
        match err {
            DocumentClientError::DuplicateKey(message) => ResourceError::AlreadyExists {
                entity: E::ENTITY_NAME.to_string(),
                id: id.map(display_id).unwrap_or(message),
            }
            .into(),
            DocumentClientError::Unavailable(message) => BackendError::Unavailable {
                backend_name,
                message,
            }
            .into(),
            DocumentClientError::InvalidInput(message) => BackendError::QueryError {
                backend_name,
                message: format!("{} on '{}': {}", E::ENTITY_NAME, self.collection, message),
            }
            .into(),
            DocumentClientError::Internal(message) => BackendError::Internal {
                backend_name,
                message,
                source: None,
            }
            .into(),
        }
    }

    async fn find_documents(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        filter: Document,
    ) -> StorageResult<Vec<E>> {
        tracing::debug!(
            collection = %self.collection,
            operation,
            predicates = filter.len(),
            correlation_id = ctx.correlation_id(),
            "document find"
        );

        let documents = ctx
            .run(operation, self.options.operation_timeout, async {
                self.client
                    .find(&self.collection, &filter)
                    .await
                    .map_err(|e| self.map_client_error(e, None))
            })
            .await?;

        documents.into_iter().map(from_document::<E>).collect()
    }
}

impl<E> std::fmt::Debug for DocumentContext<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentContext")
            .field("collection", &self.collection)
            .field("options", &self.options)
            .finish()
    }
}

#[async_trait]
impl<E: Entity> DataContext<E> for DocumentContext<E> {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::DocumentStore
    }

    fn capabilities(&self) -> &'static [BackendCapability] {
        CAPABILITIES
    }

    fn filter_policy(&self) -> FilterPolicy {
        self.options.filter_policy
    }

    async fn get(&self, ctx: &RequestContext, id: &E::Key) -> StorageResult<Option<E>> {
        let mut found = self.find_documents(ctx, "get", id_filter(id)).await?;
        Ok(if found.is_empty() {
            None
        } else {
            Some(found.swap_remove(0))
        })
    }

    async fn get_all(&self, ctx: &RequestContext) -> StorageResult<Vec<E>> {
        self.find_documents(ctx, "get_all", Document::new()).await
    }

    async fn filter_with_policy(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
        policy: FilterPolicy,
    ) -> StorageResult<Vec<E>> {
        let resolved = resolve::<E>(filters, policy)?;
        self.find_documents(ctx, "filter", build_filter_document::<E>(&resolved))
            .await
    }

    async fn save(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        let document = to_document(entity)?;
        let filter = id_filter(entity.id());

        let outcome = ctx
            .run("save", self.options.operation_timeout, async {
                self.client
                    .replace_one(&self.collection, &filter, document, true)
                    .await
                    .map_err(|e| self.map_client_error(e, Some(entity.id())))
            })
            .await?;

        tracing::debug!(
            collection = %self.collection,
            id = ?entity.id(),
            inserted = outcome.upserted,
            correlation_id = ctx.correlation_id(),
            "document saved"
        );
        Ok(())
    }

    async fn delete(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        let filter = id_filter(entity.id());
        let deleted = ctx
            .run("delete", self.options.operation_timeout, async {
                self.client
                    .delete_one(&self.collection, &filter)
                    .await
                    .map_err(|e| self.map_client_error(e, Some(entity.id())))
            })
            .await?;

        tracing::debug!(
            collection = %self.collection,
            id = ?entity.id(),
            deleted,
            correlation_id = ctx.correlation_id(),
            "document deleted"
        );
        Ok(())
    }
}

#[async_trait]
impl<E: Versioned> VersionedContext<E> for DocumentContext<E> {
    async fn save_versioned(&self, ctx: &RequestContext, entity: &mut E) -> StorageResult<()> {
        let expected = entity.version();
        let mut next = entity.clone();
        next.set_version(expected + 1);
        let document = to_document(&next)?;

        if expected == 0 {
            let inserted = ctx
                .run("save_versioned", self.options.operation_timeout, async {
                    self.client
                        .insert_one(&self.collection, document)
                        .await
                        .map_err(|e| self.map_client_error(e, Some(entity.id())))
                })
                .await;

            match inserted {
                Ok(()) => {}
                Err(StorageError::Resource(ResourceError::AlreadyExists { .. })) => {
                    let current = self.get(ctx, entity.id()).await?;
                    return Err(self.conflict(entity, current.map(|c| c.version())));
                }
                Err(err) => return Err(err),
            }
        } else {
            let mut filter = id_filter(entity.id());
            filter.insert(E::VERSION_FIELD.to_string(), Value::from(expected));

            let outcome = ctx
                .run("save_versioned", self.options.operation_timeout, async {
                    self.client
                        .replace_one(&self.collection, &filter, document, false)
                        .await
                        .map_err(|e| self.map_client_error(e, Some(entity.id())))
                })
                .await?;

            if outcome.matched == 0 {
                return match self.get(ctx, entity.id()).await? {
                    None => Err(ResourceError::NotFound {
                        entity: E::ENTITY_NAME.to_string(),
                        id: display_id(entity.id()),
                    }
                    .into()),
                    Some(current) => Err(self.conflict(entity, Some(current.version()))),
                };
            }
        }

        entity.set_version(expected + 1);
        Ok(())
    }
}

impl<E: Versioned> DocumentContext<E> {
    fn conflict(&self, entity: &E, actual_version: Option<u64>) -> StorageError {
        tracing::warn!(
            collection = %self.collection,
            id = ?entity.id(),
            expected_version = entity.version(),
            actual_version,
            "version conflict"
        );
        ConcurrencyError::VersionConflict {
            entity: E::ENTITY_NAME.to_string(),
            id: display_id(entity.id()),
            expected_version: entity.version(),
            actual_version,
        }
        .into()
    }
}
