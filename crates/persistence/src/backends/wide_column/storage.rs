use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use super::client::{
    AttributeValue, IndexQuerySpec, Item, PutCondition, ScanCondition, WideColumnApi,
    WideColumnClientError, item_from_record, item_to_record,
};
use crate::config::{ContextOptions, TableConfig};
use crate::core::{BackendCapability, BackendKind, DataContext, IndexQuery, VersionedContext};
use crate::entity::{Entity, EntityKey, FieldValue, Versioned};
use crate::error::{
    BackendError, ConcurrencyError, FilterError, ResourceError, StorageError, StorageResult,
};
use crate::request::RequestContext;
use crate::types::{FilterPolicy, FilterSet, from_record, resolve, to_record};

const CAPABILITIES: &[BackendCapability] = &[
    BackendCapability::Crud,
    BackendCapability::DynamicFilter,
    BackendCapability::AtomicUpsert,
    BackendCapability::IndexQuery,
    BackendCapability::OptimisticLocking,
];

/// A [`DataContext`] over one wide-column table.
///
/// The table's partition key is the entity's identifier field. Filters run
/// as scans with one equality condition per resolved predicate; the
/// [`IndexQuery`] implementation is the non-scan path.
pub struct ScanContext<E> {
    client: Arc<dyn WideColumnApi>,
    table: TableConfig,
    options: ContextOptions,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity> ScanContext<E> {
    /// Binds entity type `E` to `table` with default options.
    pub fn new(client: Arc<dyn WideColumnApi>, table: TableConfig) -> Self {
        Self {
            client,
            table,
            options: ContextOptions::default(),
            _marker: PhantomData,
        }
    }

    /// Replaces the context options.
    pub fn with_options(mut self, options: ContextOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the table configuration.
    pub fn table(&self) -> &TableConfig {
        &self.table
    }

    /// Returns the context options.
    pub fn options(&self) -> &ContextOptions {
        &self.options
    }

    fn key_item(id: &E::Key) -> Item {
        let mut key = Item::new();
        key.insert(
            E::ID_FIELD.to_string(),
            AttributeValue::from_field_value(&id.to_field_value()),
        );
        key
    }

    fn map_client_error(&self, err: WideColumnClientError) -> StorageError {
        let backend_name = BackendKind::WideColumn.to_string();
        match err {
            WideColumnClientError::ConditionFailed => BackendError::QueryError {
                backend_name,
                message: format!("conditional write on '{}' failed", self.table.table_name),
            }
            .into(),
            WideColumnClientError::ResourceNotFound(message) => BackendError::QueryError {
                backend_name,
                message,
            }
            .into(),
            WideColumnClientError::Throttled(message)
            | WideColumnClientError::Unavailable(message) => BackendError::Unavailable {
                backend_name,
                message,
            }
            .into(),
            WideColumnClientError::InvalidInput(message) => BackendError::QueryError {
                backend_name,
                message: format!(
                    "{} on '{}': {}",
                    E::ENTITY_NAME,
                    self.table.table_name,
                    message
                ),
            }
            .into(),
            WideColumnClientError::Internal(message) => BackendError::Internal {
                backend_name,
                message,
                source: None,
            }
            .into(),
        }
    }

    async fn scan_items(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        conditions: Vec<ScanCondition>,
    ) -> StorageResult<Vec<E>> {
        tracing::debug!(
            table = %self.table.table_name,
            operation,
            conditions = conditions.len(),
            correlation_id = ctx.correlation_id(),
            "wide-column scan"
        );

        let items = ctx
            .run(operation, self.options.operation_timeout, async {
                self.client
                    .scan(&self.table.table_name, &conditions)
                    .await
                    .map_err(|e| self.map_client_error(e))
            })
            .await?;

        items
            .iter()
            .map(|item| from_record::<E>(item_to_record(item)))
            .collect()
    }

    /// Writes `entity`, returning `false` when `condition` did not hold.
    async fn put(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        entity: &E,
        condition: Option<PutCondition>,
    ) -> StorageResult<bool> {
        let item = item_from_record(&to_record(entity)?);
        ctx.run(operation, self.options.operation_timeout, async {
            match self
                .client
                .put_item(&self.table.table_name, item, condition)
                .await
            {
                Ok(()) => Ok(true),
                Err(WideColumnClientError::ConditionFailed) => Ok(false),
                Err(err) => Err(self.map_client_error(err)),
            }
        })
        .await
    }
}

impl<E> std::fmt::Debug for ScanContext<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScanContext")
            .field("table", &self.table)
            .field("options", &self.options)
            .finish()
    }
}

#[async_trait]
impl<E: Entity> DataContext<E> for ScanContext<E> {
    fn backend_kind(&self) -> BackendKind {
        BackendKind::WideColumn
    }

    fn capabilities(&self) -> &'static [BackendCapability] {
        CAPABILITIES
    }

    fn filter_policy(&self) -> FilterPolicy {
        self.options.filter_policy
    }

    async fn get(&self, ctx: &RequestContext, id: &E::Key) -> StorageResult<Option<E>> {
        let key = Self::key_item(id);
        let item = ctx
            .run("get", self.options.operation_timeout, async {
                self.client
                    .get_item(&self.table.table_name, key)
                    .await
                    .map_err(|e| self.map_client_error(e))
            })
            .await?;

        item.map(|item| from_record::<E>(item_to_record(&item)))
            .transpose()
    }

    async fn get_all(&self, ctx: &RequestContext) -> StorageResult<Vec<E>> {
        tracing::debug!(
            table = %self.table.table_name,
            entity = E::ENTITY_NAME,
            "get_all performs a full table scan"
        );
        self.scan_items(ctx, "get_all", Vec::new()).await
    }

    async fn filter_with_policy(
        &self,
        ctx: &RequestContext,
        filters: &FilterSet,
        policy: FilterPolicy,
    ) -> StorageResult<Vec<E>> {
        let conditions = resolve::<E>(filters, policy)?
            .iter()
            .map(|predicate| {
                ScanCondition::equal(
                    predicate.field.clone(),
                    AttributeValue::from_field_value(&predicate.value),
                )
            })
            .collect();
        self.scan_items(ctx, "filter", conditions).await
    }

    async fn save(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        self.put(ctx, "save", entity, None).await?;
        tracing::debug!(
            table = %self.table.table_name,
            id = ?entity.id(),
            correlation_id = ctx.correlation_id(),
            "item saved"
        );
        Ok(())
    }

    async fn delete(&self, ctx: &RequestContext, entity: &E) -> StorageResult<()> {
        let key = Self::key_item(entity.id());
        ctx.run("delete", self.options.operation_timeout, async {
            self.client
                .delete_item(&self.table.table_name, key)
                .await
                .map_err(|e| self.map_client_error(e))
        })
        .await?;

        tracing::debug!(
            table = %self.table.table_name,
            id = ?entity.id(),
            correlation_id = ctx.correlation_id(),
            "item deleted"
        );
        Ok(())
    }
}

#[async_trait]
impl<E: Entity> IndexQuery<E> for ScanContext<E> {
    async fn query(
        &self,
        ctx: &RequestContext,
        hash_key_value: FieldValue,
        index_name: &str,
        sort_ascending: bool,
    ) -> StorageResult<Vec<E>> {
        if index_name.trim().is_empty() {
            return Err(FilterError::MissingIndexName.into());
        }

        let index = self
            .table
            .index(index_name)
            .ok_or_else(|| FilterError::UnknownIndex {
                table: self.table.table_name.clone(),
                index: index_name.to_string(),
            })?;

        match E::field_kind(&index.hash_key) {
            None => {
                return Err(FilterError::UnknownField {
                    entity: E::ENTITY_NAME.to_string(),
                    field: index.hash_key.clone(),
                }
                .into());
            }
            Some(kind) if kind != hash_key_value.kind() => {
                return Err(FilterError::TypeMismatch {
                    entity: E::ENTITY_NAME.to_string(),
                    field: index.hash_key.clone(),
                    expected: kind,
                    actual: hash_key_value.kind(),
                }
                .into());
            }
            Some(_) => {}
        }

        let spec = IndexQuerySpec {
            index_name: index.name.clone(),
            hash_key_attribute: index.hash_key.clone(),
            hash_key_value: AttributeValue::from_field_value(&hash_key_value),
            sort_key_attribute: index.sort_key.clone(),
            scan_forward: sort_ascending,
        };

        tracing::debug!(
            table = %self.table.table_name,
            index = %spec.index_name,
            hash_key = %hash_key_value,
            sort_ascending,
            correlation_id = ctx.correlation_id(),
            "wide-column index query"
        );

        let items = ctx
            .run("query", self.options.operation_timeout, async {
                self.client
                    .query(&self.table.table_name, &spec)
                    .await
                    .map_err(|e| self.map_client_error(e))
            })
            .await?;

        items
            .iter()
            .map(|item| from_record::<E>(item_to_record(item)))
            .collect()
    }
}

#[async_trait]
impl<E: Versioned> VersionedContext<E> for ScanContext<E> {
    async fn save_versioned(&self, ctx: &RequestContext, entity: &mut E) -> StorageResult<()> {
        let expected = entity.version();
        let mut next = entity.clone();
        next.set_version(expected + 1);

        let condition = if expected == 0 {
            PutCondition::AttributeNotExists(E::ID_FIELD.to_string())
        } else {
            PutCondition::AttributeEquals(
                E::VERSION_FIELD.to_string(),
                AttributeValue::N(expected.to_string()),
            )
        };

        if !self.put(ctx, "save_versioned", &next, Some(condition)).await? {
            let current = self.get(ctx, entity.id()).await?;
            let actual_version = current.as_ref().map(|c| c.version());
            if expected > 0 && current.is_none() {
                return Err(ResourceError::NotFound {
                    entity: E::ENTITY_NAME.to_string(),
                    id: entity.id().to_field_value().to_string(),
                }
                .into());
            }
            tracing::warn!(
                table = %self.table.table_name,
                id = ?entity.id(),
                expected_version = expected,
                actual_version,
                "version conflict"
            );
            return Err(ConcurrencyError::VersionConflict {
                entity: E::ENTITY_NAME.to_string(),
                id: entity.id().to_field_value().to_string(),
                expected_version: expected,
                actual_version,
            }
            .into());
        }

        entity.set_version(expected + 1);
        Ok(())
    }
}
