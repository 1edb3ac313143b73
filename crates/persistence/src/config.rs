//! Backend and data context configuration.
//!
//! All configuration structs deserialize with serde and expose a
//! `validate()` method that the production clients call before connecting.
//!
//! # Example
//!
//! ```
//! use storefront_persistence::config::{ContextOptions, TableConfig};
//! use storefront_persistence::types::FilterPolicy;
//!
//! let table: TableConfig = serde_json::from_str(r#"{
//!     "table_name": "orders",
//!     "indexes": [
//!         { "name": "UserIndex", "hash_key": "user_id", "sort_key": "date_time" }
//!     ]
//! }"#).unwrap();
//! assert!(table.validate().is_ok());
//!
//! let options: ContextOptions = serde_json::from_str(r#"{
//!     "filter_policy": "strict",
//!     "operation_timeout": "5s"
//! }"#).unwrap();
//! assert_eq!(options.filter_policy, FilterPolicy::Strict);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{StorageResult, ValidationError};
use crate::types::FilterPolicy;

fn invalid(message: impl Into<String>) -> crate::error::StorageError {
    ValidationError::InvalidConfiguration {
        message: message.into(),
    }
    .into()
}

/// Connection settings for the document store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentStoreConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`.
    pub connection_string: String,

    /// The database holding the entity collections.
    pub database_name: String,
}

impl DocumentStoreConfig {
    /// Creates a configuration.
    pub fn new(connection_string: impl Into<String>, database_name: impl Into<String>) -> Self {
        Self {
            connection_string: connection_string.into(),
            database_name: database_name.into(),
        }
    }

    /// Validates configuration invariants.
    pub fn validate(&self) -> StorageResult<()> {
        if self.connection_string.trim().is_empty() {
            return Err(invalid("connection_string is required"));
        }
        if self.database_name.trim().is_empty() {
            return Err(invalid("database_name is required"));
        }
        Ok(())
    }
}

/// Connection settings for the wide-column store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WideColumnStoreConfig {
    /// Static access key id. Falls back to the provider chain if unset.
    pub access_key_id: Option<String>,

    /// Static secret access key. Required together with `access_key_id`.
    pub secret_access_key: Option<String>,

    /// Talk to a local emulator at `service_url`.
    #[serde(default)]
    pub local_mode: bool,

    /// Endpoint override, e.g. `http://localhost:8000`.
    pub service_url: Option<String>,

    /// Region name, e.g. `eu-west-1`.
    pub region: Option<String>,
}

impl WideColumnStoreConfig {
    /// Validates configuration invariants.
    pub fn validate(&self) -> StorageResult<()> {
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            return Err(invalid(
                "access_key_id and secret_access_key must be set together",
            ));
        }

        if let Some(url) = &self.service_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(invalid(format!(
                "service_url must start with http:// or https://, got '{}'",
                url
            )));
        }

        if self.local_mode && self.service_url.is_none() && self.region.is_none() {
            return Err(invalid("local_mode requires service_url or region"));
        }

        Ok(())
    }
}

/// A secondary index declared on a wide-column table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryIndex {
    /// The index name used in queries.
    pub name: String,

    /// The attribute the index is partitioned on.
    pub hash_key: String,

    /// The attribute results are ordered by.
    #[serde(default)]
    pub sort_key: Option<String>,
}

impl SecondaryIndex {
    /// Declares an index partitioned on `hash_key`.
    pub fn new(name: impl Into<String>, hash_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hash_key: hash_key.into(),
            sort_key: None,
        }
    }

    /// Sets the sort key.
    pub fn with_sort_key(mut self, sort_key: impl Into<String>) -> Self {
        self.sort_key = Some(sort_key.into());
        self
    }
}

/// A wide-column table bound to one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    /// The physical table name.
    pub table_name: String,

    /// Declared secondary indexes.
    #[serde(default)]
    pub indexes: Vec<SecondaryIndex>,
}

impl TableConfig {
    /// Creates a table configuration without indexes.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            indexes: Vec::new(),
        }
    }

    /// Declares a secondary index.
    pub fn with_index(mut self, index: SecondaryIndex) -> Self {
        self.indexes.push(index);
        self
    }

    /// Looks up a declared index by name.
    pub fn index(&self, name: &str) -> Option<&SecondaryIndex> {
        self.indexes.iter().find(|index| index.name == name)
    }

    /// Validates configuration invariants.
    pub fn validate(&self) -> StorageResult<()> {
        if self.table_name.trim().is_empty() {
            return Err(invalid("table_name is required"));
        }

        for (i, index) in self.indexes.iter().enumerate() {
            if index.name.trim().is_empty() {
                return Err(invalid(format!(
                    "index #{} on '{}' has no name",
                    i, self.table_name
                )));
            }
            if index.hash_key.trim().is_empty() {
                return Err(invalid(format!("index '{}' has no hash_key", index.name)));
            }
            if self.indexes[..i].iter().any(|other| other.name == index.name) {
                return Err(invalid(format!(
                    "index '{}' is declared twice on '{}'",
                    index.name, self.table_name
                )));
            }
        }

        Ok(())
    }
}

/// Behaviour shared by both adapters' data contexts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOptions {
    /// Handling of unknown or mistyped string-keyed filter fields.
    #[serde(default)]
    pub filter_policy: FilterPolicy,

    /// Default timeout for each backend call, e.g. `"5s"` or `"250ms"`.
    #[serde(default, with = "humantime_opt")]
    pub operation_timeout: Option<Duration>,
}

impl ContextOptions {
    /// Sets the filter policy.
    pub fn with_filter_policy(mut self, policy: FilterPolicy) -> Self {
        self.filter_policy = policy;
        self
    }

    /// Sets the default operation timeout.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }
}

mod humantime_opt {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => {
                serializer.serialize_str(&humantime::format_duration(*duration).to_string())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
