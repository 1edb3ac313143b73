use std::collections::HashMap;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::AttributeValue as SdkAttributeValue;

use super::client::{
    AttributeValue, IndexQuerySpec, Item, PutCondition, ScanCondition, ScanOperator,
    WideColumnApi, WideColumnClientError,
};
use crate::config::WideColumnStoreConfig;
use crate::error::StorageResult;

const LOCAL_REGION: &str = "us-east-1";

/// [`WideColumnApi`] over AWS DynamoDB.
///
/// Tables must have a single string or number partition key named like the
/// entity's identifier field.
#[derive(Debug, Clone)]
pub struct AwsDynamoDbClient {
    client: Client,
}

impl AwsDynamoDbClient {
    /// Creates a client from a loaded SDK configuration.
    pub fn from_sdk_config(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }

    /// Loads an SDK configuration from validated store settings.
    ///
    /// Static credentials are used when both keys are set; otherwise the
    /// default provider chain applies. Local mode without a region uses
    /// `us-east-1`, which local emulators accept.
    pub async fn load_sdk_config(config: &WideColumnStoreConfig) -> StorageResult<SdkConfig> {
        config.validate()?;

        let mut loader = aws_config::defaults(BehaviorVersion::latest());

        match (&config.region, config.local_mode) {
            (Some(region), _) => loader = loader.region(Region::new(region.clone())),
            (None, true) => loader = loader.region(Region::new(LOCAL_REGION)),
            (None, false) => {}
        }

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key_id.clone(),
                secret_access_key.clone(),
                None,
                None,
                "storefront-config",
            ));
        }

        if let Some(url) = &config.service_url {
            loader = loader.endpoint_url(url.clone());
        }

        tracing::debug!(
            local_mode = config.local_mode,
            region = config.region.as_deref(),
            service_url = config.service_url.as_deref(),
            "loading dynamodb configuration"
        );
        Ok(loader.load().await)
    }
}

#[async_trait]
impl WideColumnApi for AwsDynamoDbClient {
    async fn get_item(&self, table: &str, key: Item) -> Result<Option<Item>, WideColumnClientError> {
        let out = self
            .client
            .get_item()
            .table_name(table)
            .set_key(Some(to_sdk_item(&key)))
            .consistent_read(true)
            .send()
            .await
            .map_err(map_sdk_error)?;

        out.item.map(from_sdk_item).transpose()
    }

    async fn scan(
        &self,
        table: &str,
        conditions: &[ScanCondition],
    ) -> Result<Vec<Item>, WideColumnClientError> {
        let mut expression = Vec::with_capacity(conditions.len());
        let mut names = HashMap::new();
        let mut values = HashMap::new();
        for (i, condition) in conditions.iter().enumerate() {
            let name = format!("#a{i}");
            let value = format!(":v{i}");
            match condition.operator {
                ScanOperator::Equal => expression.push(format!("{name} = {value}")),
            }
            names.insert(name, condition.attribute.clone());
            values.insert(value, to_sdk(&condition.value));
        }

        let mut items = Vec::new();
        let mut start_key: Option<HashMap<String, SdkAttributeValue>> = None;

        loop {
            let mut req = self
                .client
                .scan()
                .table_name(table)
                .set_exclusive_start_key(start_key.take());
            if !expression.is_empty() {
                req = req
                    .filter_expression(expression.join(" AND "))
                    .set_expression_attribute_names(Some(names.clone()))
                    .set_expression_attribute_values(Some(values.clone()));
            }

            let out = req.send().await.map_err(map_sdk_error)?;
            for item in out.items.unwrap_or_default() {
                items.push(from_sdk_item(item)?);
            }

            start_key = out.last_evaluated_key;
            if start_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    async fn query(
        &self,
        table: &str,
        spec: &IndexQuerySpec,
    ) -> Result<Vec<Item>, WideColumnClientError> {
        let mut items = Vec::new();
        let mut start_key: Option<HashMap<String, SdkAttributeValue>> = None;

        loop {
            let out = self
                .client
                .query()
                .table_name(table)
                .index_name(&spec.index_name)
                .key_condition_expression("#h = :h")
                .expression_attribute_names("#h", &spec.hash_key_attribute)
                .expression_attribute_values(":h", to_sdk(&spec.hash_key_value))
                .scan_index_forward(spec.scan_forward)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(map_sdk_error)?;

            for item in out.items.unwrap_or_default() {
                items.push(from_sdk_item(item)?);
            }

            start_key = out.last_evaluated_key;
            if start_key.is_none() {
                break;
            }
        }

        Ok(items)
    }

    async fn put_item(
        &self,
        table: &str,
        item: Item,
        condition: Option<PutCondition>,
    ) -> Result<(), WideColumnClientError> {
        let mut req = self
            .client
            .put_item()
            .table_name(table)
            .set_item(Some(to_sdk_item(&item)));

        match condition {
            Some(PutCondition::AttributeNotExists(attribute)) => {
                req = req
                    .condition_expression("attribute_not_exists(#c)")
                    .expression_attribute_names("#c", attribute);
            }
            Some(PutCondition::AttributeEquals(attribute, value)) => {
                req = req
                    .condition_expression("#c = :c")
                    .expression_attribute_names("#c", attribute)
                    .expression_attribute_values(":c", to_sdk(&value));
            }
            None => {}
        }

        req.send().await.map_err(map_sdk_error)?;
        Ok(())
    }

    async fn delete_item(&self, table: &str, key: Item) -> Result<(), WideColumnClientError> {
        self.client
            .delete_item()
            .table_name(table)
            .set_key(Some(to_sdk_item(&key)))
            .send()
            .await
            .map_err(map_sdk_error)?;
        Ok(())
    }
}

fn to_sdk(value: &AttributeValue) -> SdkAttributeValue {
    match value {
        AttributeValue::S(s) => SdkAttributeValue::S(s.clone()),
        AttributeValue::N(n) => SdkAttributeValue::N(n.clone()),
        AttributeValue::Bool(b) => SdkAttributeValue::Bool(*b),
        AttributeValue::Null => SdkAttributeValue::Null(true),
        AttributeValue::L(items) => SdkAttributeValue::L(items.iter().map(to_sdk).collect()),
        AttributeValue::M(map) => SdkAttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), to_sdk(v)))
                .collect(),
        ),
    }
}

fn from_sdk(value: SdkAttributeValue) -> Result<AttributeValue, WideColumnClientError> {
    Ok(match value {
        SdkAttributeValue::S(s) => AttributeValue::S(s),
        SdkAttributeValue::N(n) => AttributeValue::N(n),
        SdkAttributeValue::Bool(b) => AttributeValue::Bool(b),
        SdkAttributeValue::Null(_) => AttributeValue::Null,
        SdkAttributeValue::L(items) => AttributeValue::L(
            items
                .into_iter()
                .map(from_sdk)
                .collect::<Result<_, _>>()?,
        ),
        SdkAttributeValue::M(map) => AttributeValue::M(from_sdk_item(map)?),
        SdkAttributeValue::Ss(items) => {
            AttributeValue::L(items.into_iter().map(AttributeValue::S).collect())
        }
        SdkAttributeValue::Ns(items) => {
            AttributeValue::L(items.into_iter().map(AttributeValue::N).collect())
        }
        other => {
            return Err(WideColumnClientError::InvalidInput(format!(
                "unsupported attribute type: {other:?}"
            )));
        }
    })
}

fn to_sdk_item(item: &Item) -> HashMap<String, SdkAttributeValue> {
    item.iter().map(|(k, v)| (k.clone(), to_sdk(v))).collect()
}

fn from_sdk_item(
    item: HashMap<String, SdkAttributeValue>,
) -> Result<Item, WideColumnClientError> {
    item.into_iter()
        .map(|(k, v)| from_sdk(v).map(|v| (k, v)))
        .collect()
}

fn map_sdk_error<E>(err: SdkError<E>) -> WideColumnClientError
where
    E: ProvideErrorMetadata + std::fmt::Debug,
{
    let fallback = format!("{err:?}");

    match err {
        SdkError::ServiceError(service_err) => {
            let code = service_err.err().code().unwrap_or("Unknown");
            let message = service_err
                .err()
                .message()
                .map(str::to_string)
                .unwrap_or_else(|| fallback.clone());
            match code {
                "ConditionalCheckFailedException" => WideColumnClientError::ConditionFailed,
                "ResourceNotFoundException" => WideColumnClientError::ResourceNotFound(message),
                "ProvisionedThroughputExceededException"
                | "ThrottlingException"
                | "RequestLimitExceeded" => WideColumnClientError::Throttled(message),
                "ValidationException" => WideColumnClientError::InvalidInput(message),
                _ => WideColumnClientError::Internal(message),
            }
        }
        SdkError::TimeoutError(_) => WideColumnClientError::Unavailable(fallback),
        SdkError::DispatchFailure(_) => WideColumnClientError::Unavailable(fallback),
        _ => WideColumnClientError::Internal(fallback),
    }
}
