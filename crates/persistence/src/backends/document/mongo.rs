use async_trait::async_trait;
use mongodb::bson;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Client, Database};

use super::client::{Document, DocumentApi, DocumentClientError, ReplaceOutcome};
use crate::config::DocumentStoreConfig;
use crate::error::{BackendError, StorageResult};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// [`DocumentApi`] over a MongoDB database.
#[derive(Debug, Clone)]
pub struct MongoDocumentClient {
    database: Database,
}

impl MongoDocumentClient {
    /// Wraps an existing database handle.
    pub fn from_database(database: Database) -> Self {
        Self { database }
    }

    /// Connects using a validated configuration.
    pub async fn connect(config: &DocumentStoreConfig) -> StorageResult<Self> {
        config.validate()?;
        let client = Client::with_uri_str(&config.connection_string)
            .await
            .map_err(|e| BackendError::ConnectionFailed {
                backend_name: "mongodb".to_string(),
                message: e.to_string(),
            })?;
        tracing::debug!(database = %config.database_name, "connected to mongodb");
        Ok(Self::from_database(client.database(&config.database_name)))
    }

    fn collection(&self, name: &str) -> mongodb::Collection<bson::Document> {
        self.database.collection::<bson::Document>(name)
    }
}

#[async_trait]
impl DocumentApi for MongoDocumentClient {
    async fn find(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<Vec<Document>, DocumentClientError> {
        let mut cursor = self
            .collection(collection)
            .find(to_bson(filter)?)
            .await
            .map_err(map_mongo_error)?;

        let mut out = Vec::new();
        while cursor.advance().await.map_err(map_mongo_error)? {
            let raw = cursor.deserialize_current().map_err(map_mongo_error)?;
            out.push(from_bson(raw)?);
        }
        Ok(out)
    }

    async fn insert_one(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<(), DocumentClientError> {
        self.collection(collection)
            .insert_one(to_bson(&document)?)
            .await
            .map_err(map_mongo_error)?;
        Ok(())
    }

    async fn replace_one(
        &self,
        collection: &str,
        filter: &Document,
        replacement: Document,
        upsert: bool,
    ) -> Result<ReplaceOutcome, DocumentClientError> {
        let out = self
            .collection(collection)
            .replace_one(to_bson(filter)?, to_bson(&replacement)?)
            .upsert(upsert)
            .await
            .map_err(map_mongo_error)?;
        Ok(ReplaceOutcome {
            matched: out.matched_count,
            upserted: out.upserted_id.is_some(),
        })
    }

    async fn delete_one(
        &self,
        collection: &str,
        filter: &Document,
    ) -> Result<u64, DocumentClientError> {
        let out = self
            .collection(collection)
            .delete_one(to_bson(filter)?)
            .await
            .map_err(map_mongo_error)?;
        Ok(out.deleted_count)
    }
}

fn to_bson(document: &Document) -> Result<bson::Document, DocumentClientError> {
    bson::to_document(document)
        .map_err(|e| DocumentClientError::InvalidInput(format!("failed to encode BSON: {e}")))
}

fn from_bson(document: bson::Document) -> Result<Document, DocumentClientError> {
    bson::from_document(document)
        .map_err(|e| DocumentClientError::Internal(format!("failed to decode BSON: {e}")))
}

fn map_mongo_error(err: mongodb::error::Error) -> DocumentClientError {
    let message = err.to_string();
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            DocumentClientError::DuplicateKey(message)
        }
        ErrorKind::ServerSelection { .. }
        | ErrorKind::Io(_)
        | ErrorKind::ConnectionPoolCleared { .. } => DocumentClientError::Unavailable(message),
        ErrorKind::InvalidArgument { .. } => DocumentClientError::InvalidInput(message),
        _ => DocumentClientError::Internal(message),
    }
}
