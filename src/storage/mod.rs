//! Storage connectors.
//!
//! Every backend implements [`DatabaseConnector`]: insert, update, delete,
//! find, find-all and query over its own element and query types. Connectors
//! are constructed connected or not at all.

mod mongo_store;
mod redis_store;

pub use self::mongo_store::MongoConnector;
pub use self::redis_store::{RedisConnector, RedisElement};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage connection error: {0}")]
    Connection(String),

    #[error("key not found: {0}")]
    KeyNotFound(String),

    #[error("operation not supported: {0}")]
    Unsupported(String),

    #[error("storage operation error: {0}")]
    Operation(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Uniform CRUD surface over a storage backend.
pub trait DatabaseConnector {
    type Element;
    type Query;

    fn insert(&self, element: &Self::Element) -> StorageResult<()>;

    /// Replace an existing element; `KeyNotFound` if there is none.
    fn update(&self, element: &Self::Element) -> StorageResult<()>;

    fn delete(&self, element: &Self::Element) -> StorageResult<()>;

    /// Look up the stored element matching `element`'s identity.
    fn find(&self, element: &Self::Element) -> StorageResult<Self::Element>;

    /// Every stored element.
    fn find_all(&self) -> StorageResult<Vec<Self::Element>>;

    fn query(&self, query: &Self::Query) -> StorageResult<Vec<Self::Element>>;
}
