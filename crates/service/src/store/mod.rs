//! Record store abstraction: three loosely-schematized collections behind a
//! narrow find/insert contract. Services depend on the trait; the MongoDB
//! implementation and an in-memory one for tests live in submodules.

use async_trait::async_trait;
use mongodb::bson::Document;
use thiserror::Error;

pub mod memory;
pub mod mongo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("unique constraint violated: {0}")]
    Conflict(String),
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// Durable storage for movie, review, and user records.
///
/// `find` matches records whose fields equal the filter values exactly; no
/// range or partial matching is offered. `insert` appends a record and
/// returns it with the store-assigned handle (`_id`). The store enforces no
/// cross-collection constraints beyond its declared unique indexes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError>;
    async fn insert(&self, collection: &str, record: Document) -> Result<Document, StoreError>;
}
