//! In-memory record store for tests and doc examples. Mirrors the MongoDB
//! behavior the services rely on: exact-equality filters, `_id` assignment
//! on insert, and unique-key conflicts for collections that declare them.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};

use super::{RecordStore, StoreError};

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
    unique_keys: Mutex<HashMap<String, Vec<String>>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preconfigured with the same unique keys `ensure_indexes`
    /// declares on the real database.
    pub fn for_app() -> Self {
        Self::new().with_unique(models::user::COLLECTION, "username")
    }

    /// Declare a unique key for a collection; inserts that would duplicate
    /// an existing value fail with `StoreError::Conflict`.
    pub fn with_unique(self, collection: &str, field: &str) -> Self {
        self.unique_keys
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .push(field.to_string());
        self
    }

    /// Seed records directly, bypassing unique checks. Lets tests set up
    /// states the write path forbids, such as duplicate accounts.
    pub fn seed(&self, collection: &str, docs: Vec<Document>) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .extend(docs);
    }

    /// Simulate a lost connection; all operations fail until cleared.
    pub fn set_unavailable(&self, down: bool) {
        self.unavailable.store(down, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        Ok(())
    }
}

/// Equality with numeric coercion, matching how MongoDB compares an Int32
/// against an Int64 filter value.
fn bson_eq(a: &Bson, b: &Bson) -> bool {
    match (numeric(a), numeric(b)) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn numeric(v: &Bson) -> Option<f64> {
    match v {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(d) => Some(*d),
        _ => None,
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter
        .iter()
        .all(|(k, v)| doc.get(k).map(|dv| bson_eq(dv, v)).unwrap_or(false))
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find(&self, collection: &str, filter: Document) -> Result<Vec<Document>, StoreError> {
        self.check_available()?;
        let collections = self.collections.lock().unwrap();
        let docs = collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|d| matches(d, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    async fn insert(&self, collection: &str, record: Document) -> Result<Document, StoreError> {
        self.check_available()?;
        let mut collections = self.collections.lock().unwrap();
        let records = collections.entry(collection.to_string()).or_default();

        let unique_keys = self.unique_keys.lock().unwrap();
        if let Some(fields) = unique_keys.get(collection) {
            for field in fields {
                if let Some(value) = record.get(field) {
                    let taken = records
                        .iter()
                        .any(|d| d.get(field).map(|dv| bson_eq(dv, value)).unwrap_or(false));
                    if taken {
                        return Err(StoreError::Conflict(format!(
                            "duplicate key: {}.{}",
                            collection, field
                        )));
                    }
                }
            }
        }

        let mut stored = record;
        stored.insert("_id", ObjectId::new());
        records.push(stored.clone());
        Ok(stored)
    }
}
