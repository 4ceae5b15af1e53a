//! Document store gateway for lifeline.
//!
//! This module provides insert-and-fetch access to the two record
//! collections behind the [`DocumentStore`] trait: [`MongoStore`] for the
//! real cluster, [`MemoryStore`] for tests and local development.
//! Collections are appended to, never mutated in place.

use std::collections::HashMap;
use std::sync::Mutex;

use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::options::{ClientOptions, Credential};
use mongodb::{Client, Database};
use tracing::{debug, info, warn};

use crate::config::StoreConfig;
use crate::error::Result;

/// Collection holding emergency records.
pub const EMERGENCY_COLLECTION: &str = "emergency";

/// Collection holding medical records.
pub const MEDICAL_RECORD_COLLECTION: &str = "medical_record";

/// Insert-and-fetch operations against named collections.
///
/// `call_id` is not unique: multiple documents may share one, and lookups
/// return the first match in the store's natural scan order.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + std::fmt::Debug {
    /// Insert a document, returning the generated identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable or rejects the write.
    async fn insert(&self, collection: &str, document: Document) -> Result<String>;

    /// Fetch the first document whose `call_id` matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is unreachable.
    async fn find_by_call_id(&self, collection: &str, call_id: &str) -> Result<Option<Document>>;

    /// Whether the store is reachable. Diagnostics only.
    async fn ping(&self) -> bool;
}

/// Render a generated identifier as a string.
fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        other => other.to_string(),
    }
}

/// Replace an `ObjectId` `_id` with its hex string so the document can
/// leave the gateway as plain JSON.
fn stringify_id(mut document: Document) -> Document {
    if let Some(Bson::ObjectId(oid)) = document.get("_id") {
        let hex = oid.to_hex();
        document.insert("_id", hex);
    }
    document
}

/// Gateway to a MongoDB-compatible document database.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
}

impl std::fmt::Debug for MongoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MongoStore")
            .field("database", &self.db.name())
            .finish()
    }
}

impl MongoStore {
    /// Connect to the cluster named by the store configuration.
    ///
    /// The client handle is process-wide: connect once at startup and
    /// share it. Connection pooling is the driver's concern.
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing or the connection
    /// string cannot be resolved.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        config.require_credentials()?;

        let mut options = ClientOptions::parse(config.connection_string()).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.credential = Some(
            Credential::builder()
                .username(config.username.clone())
                .password(config.password.clone())
                .build(),
        );

        let client = Client::with_options(options)?;
        info!("connected to document store database {}", config.database);
        Ok(Self {
            db: client.database(&config.database),
        })
    }

    /// The database this gateway operates on.
    #[must_use]
    pub fn database_name(&self) -> &str {
        self.db.name()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, document: Document) -> Result<String> {
        let result = self
            .db
            .collection::<Document>(collection)
            .insert_one(document)
            .await?;
        let id = id_to_string(&result.inserted_id);
        debug!("inserted document {id} into {collection}");
        Ok(id)
    }

    async fn find_by_call_id(&self, collection: &str, call_id: &str) -> Result<Option<Document>> {
        let found = self
            .db
            .collection::<Document>(collection)
            .find_one(doc! { "call_id": call_id })
            .await?;
        Ok(found.map(stringify_id))
    }

    async fn ping(&self) -> bool {
        match self.db.run_command(doc! { "ping": 1 }).await {
            Ok(_) => true,
            Err(err) => {
                warn!("store ping failed: {err}");
                false
            }
        }
    }
}

/// In-process [`DocumentStore`] backed by per-collection vectors.
///
/// Preserves insertion order, so "first match" behaves like the real
/// store's natural scan order. Used by tests and local development.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(collection)
            .map_or(0, Vec::len)
    }

    /// Whether a collection holds no documents.
    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut document: Document) -> Result<String> {
        let id = ObjectId::new();
        document.insert("_id", id);

        self.collections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(collection.to_string())
            .or_default()
            .push(document);

        Ok(id.to_hex())
    }

    async fn find_by_call_id(&self, collection: &str, call_id: &str) -> Result<Option<Document>> {
        let collections = self
            .collections
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let found = collections
            .get(collection)
            .and_then(|documents| {
                documents
                    .iter()
                    .find(|document| document.get_str("call_id") == Ok(call_id))
            })
            .cloned();

        Ok(found.map(stringify_id))
    }

    async fn ping(&self) -> bool {
        true
    }
}
