//! Document connector backed by MongoDB.
//!
//! Uses the driver's synchronous API, so like the blocking client it must not
//! be called from inside an async runtime thread.

use mongodb::bson::{doc, Bson, Document};
use mongodb::sync::{Client, Collection, Database};
use tracing::{error, info, warn};

use super::{DatabaseConnector, StorageError, StorageResult};

const SERVER_SELECTION_TIMEOUT_MS: u64 = 5000;

/// MongoDB connector bound to one collection. Construction pings the server
/// and fails if it cannot.
///
/// Elements are BSON documents identified by their `_id`; queries are
/// filter documents.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    db: Database,
    collection: Collection<Document>,
}

impl MongoConnector {
    pub fn connect(host: &str, port: u16, db_name: &str, collection: &str) -> StorageResult<Self> {
        let uri = format!(
            "mongodb://{}:{}/?serverSelectionTimeoutMS={}",
            host, port, SERVER_SELECTION_TIMEOUT_MS
        );
        Self::connect_uri(&uri, db_name, collection)
    }

    pub fn connect_uri(uri: &str, db_name: &str, collection: &str) -> StorageResult<Self> {
        if collection.trim().is_empty() {
            return Err(StorageError::Connection("collection name must be provided".to_string()));
        }

        let client = Client::with_uri_str(uri).map_err(|e| {
            error!(error = %e, "Invalid MongoDB connection parameters");
            StorageError::Connection(e.to_string())
        })?;
        let db = client.database(db_name);
        db.run_command(doc! { "ping": 1 }, None).map_err(|e| {
            error!(error = %e, "Failed to connect to MongoDB");
            StorageError::Connection(e.to_string())
        })?;

        info!(db = db_name, collection, "Connected to MongoDB successfully");
        Ok(Self {
            collection: db.collection(collection),
            db,
        })
    }

    /// Same server and database, different collection.
    pub fn with_collection(&self, collection: &str) -> Self {
        Self {
            db: self.db.clone(),
            collection: self.db.collection(collection),
        }
    }

    pub fn collection_name(&self) -> &str {
        self.collection.name()
    }
}

fn document_id(element: &Document) -> StorageResult<&Bson> {
    element
        .get("_id")
        .ok_or_else(|| StorageError::Operation("document has no _id".to_string()))
}

impl DatabaseConnector for MongoConnector {
    type Element = Document;
    type Query = Document;

    fn insert(&self, element: &Document) -> StorageResult<()> {
        let result = self.collection.insert_one(element, None).map_err(|e| {
            error!(collection = self.collection.name(), error = %e, "Error inserting document");
            StorageError::Operation(format!("error inserting document: {}", e))
        })?;
        info!(collection = self.collection.name(), id = %result.inserted_id, "Inserted document");
        Ok(())
    }

    fn update(&self, element: &Document) -> StorageResult<()> {
        let id = document_id(element)?;
        let mut fields = element.clone();
        fields.remove("_id");

        let result = self
            .collection
            .update_one(doc! { "_id": id.clone() }, doc! { "$set": fields }, None)
            .map_err(|e| {
                error!(collection = self.collection.name(), id = %id, error = %e, "Error updating document");
                StorageError::Operation(format!("error updating document {}: {}", id, e))
            })?;
        if result.matched_count == 0 {
            warn!(collection = self.collection.name(), id = %id, "Document not found for update");
            return Err(StorageError::KeyNotFound(id.to_string()));
        }
        info!(collection = self.collection.name(), id = %id, "Updated document");
        Ok(())
    }

    fn delete(&self, element: &Document) -> StorageResult<()> {
        let id = document_id(element)?;
        self.collection
            .delete_one(doc! { "_id": id.clone() }, None)
            .map_err(|e| {
                error!(collection = self.collection.name(), id = %id, error = %e, "Error deleting document");
                StorageError::Operation(format!("error deleting document {}: {}", id, e))
            })?;
        info!(collection = self.collection.name(), id = %id, "Deleted document");
        Ok(())
    }

    fn find(&self, element: &Document) -> StorageResult<Document> {
        let id = document_id(element)?;
        let found = self
            .collection
            .find_one(doc! { "_id": id.clone() }, None)
            .map_err(|e| {
                error!(collection = self.collection.name(), id = %id, error = %e, "Error finding document");
                StorageError::Operation(format!("error finding document {}: {}", id, e))
            })?;
        found.ok_or_else(|| {
            warn!(collection = self.collection.name(), id = %id, "Document not found");
            StorageError::KeyNotFound(id.to_string())
        })
    }

    fn find_all(&self) -> StorageResult<Vec<Document>> {
        self.query(&Document::new())
    }

    fn query(&self, query: &Document) -> StorageResult<Vec<Document>> {
        let cursor = self.collection.find(query.clone(), None).map_err(|e| {
            error!(collection = self.collection.name(), error = %e, "Error querying documents");
            StorageError::Operation(format!("error querying documents: {}", e))
        })?;
        cursor
            .collect::<mongodb::error::Result<Vec<Document>>>()
            .map_err(|e| StorageError::Operation(format!("error reading query results: {}", e)))
    }
}
