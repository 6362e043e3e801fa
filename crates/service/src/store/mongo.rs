use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::Document;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::{Collection, Database};
use tokio::time::timeout;
use tracing::warn;

use super::{RecordStore, StoreError};

/// MongoDB-backed record store. Owns an injected `Database` handle (the
/// driver pools connections behind it) and wraps every operation in a
/// bounded timeout so a hung server surfaces as `Unavailable` instead of a
/// stuck request.
pub struct MongoStore {
    db: Database,
    op_timeout: Duration,
}

impl MongoStore {
    pub fn new(db: Database, op_timeout: Duration) -> Self {
        Self { db, op_timeout }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection::<Document>(name)
    }

    async fn bounded<T, F>(&self, op: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: std::future::IntoFuture<Output = Result<T, mongodb::error::Error>>,
    {
        match timeout(self.op_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(map_driver_error(e)),
            Err(_) => {
                warn!(op, timeout_secs = self.op_timeout.as_secs(), "store call timed out");
                Err(StoreError::Unavailable(format!("{op} timed out")))
            }
        }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        &*err.kind,
        ErrorKind::Write(WriteFailure::WriteError(we)) if we.code == 11000
    )
}

fn map_driver_error(err: mongodb::error::Error) -> StoreError {
    if is_duplicate_key(&err) {
        StoreError::Conflict(err.to_string())
    } else {
        StoreError::Unavailable(err.to_string())
    }
}

#[async_trait]
impl RecordStore for MongoStore {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        let coll = self.collection(collection);
        let cursor = self.bounded("find", coll.find(filter)).await?;
        self.bounded("find_drain", cursor.try_collect::<Vec<Document>>())
            .await
    }

    async fn insert(&self, collection: &str, record: Document) -> Result<Document, StoreError> {
        let coll = self.collection(collection);
        let result = self.bounded("insert", coll.insert_one(record.clone())).await?;
        let mut stored = record;
        stored.insert("_id", result.inserted_id);
        Ok(stored)
    }
}
