//! Key-value connector backed by Redis.

use std::time::Duration;

use redis::{Client, Commands, Connection};
use tracing::{error, info, warn};

use super::{DatabaseConnector, StorageError, StorageResult};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One key and its string value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedisElement {
    pub key: String,
    pub value: String,
}

impl RedisElement {
    pub fn new(key: &str, value: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    /// Element that only identifies a key, for `find` and `delete`.
    pub fn key(key: &str) -> Self {
        Self::new(key, "")
    }
}

/// Redis connector. Construction pings the server and fails if it cannot.
#[derive(Debug, Clone)]
pub struct RedisConnector {
    client: Client,
}

impl RedisConnector {
    pub fn connect(host: &str, port: u16, db: i64) -> StorageResult<Self> {
        Self::connect_url(&format!("redis://{}:{}/{}", host, port, db))
    }

    pub fn connect_url(url: &str) -> StorageResult<Self> {
        let client = Client::open(url).map_err(|e| {
            error!(error = %e, "Invalid Redis connection parameters");
            StorageError::Connection(e.to_string())
        })?;
        let connector = Self { client };

        let mut conn = connector.connection()?;
        redis::cmd("PING").query::<String>(&mut conn).map_err(|e| {
            error!(error = %e, "Failed to connect to Redis");
            StorageError::Connection(e.to_string())
        })?;

        info!("Connected to Redis successfully");
        Ok(connector)
    }

    fn connection(&self) -> StorageResult<Connection> {
        self.client.get_connection_with_timeout(CONNECT_TIMEOUT).map_err(|e| {
            error!(error = %e, "Failed to open Redis connection");
            StorageError::Connection(e.to_string())
        })
    }
}

impl DatabaseConnector for RedisConnector {
    type Element = RedisElement;
    type Query = ();

    fn insert(&self, element: &RedisElement) -> StorageResult<()> {
        let mut conn = self.connection()?;
        conn.set::<_, _, ()>(&element.key, &element.value).map_err(|e| {
            error!(key = %element.key, error = %e, "Error inserting key");
            StorageError::Operation(format!("error inserting key {}: {}", element.key, e))
        })?;
        info!(key = %element.key, "Inserted key");
        Ok(())
    }

    fn update(&self, element: &RedisElement) -> StorageResult<()> {
        let mut conn = self.connection()?;
        // SET .. XX only writes an existing key and replies nil otherwise.
        let reply: Option<String> = redis::cmd("SET")
            .arg(&element.key)
            .arg(&element.value)
            .arg("XX")
            .query(&mut conn)
            .map_err(|e| {
                error!(key = %element.key, error = %e, "Error updating key");
                StorageError::Operation(format!("error updating key {}: {}", element.key, e))
            })?;
        if reply.is_none() {
            warn!(key = %element.key, "Key not found for update");
            return Err(StorageError::KeyNotFound(element.key.clone()));
        }
        info!(key = %element.key, "Updated key");
        Ok(())
    }

    fn delete(&self, element: &RedisElement) -> StorageResult<()> {
        let mut conn = self.connection()?;
        conn.del::<_, i64>(&element.key).map_err(|e| {
            error!(key = %element.key, error = %e, "Error deleting key");
            StorageError::Operation(format!("error deleting key {}: {}", element.key, e))
        })?;
        info!(key = %element.key, "Deleted key");
        Ok(())
    }

    fn find(&self, element: &RedisElement) -> StorageResult<RedisElement> {
        let mut conn = self.connection()?;
        let value: Option<String> = conn.get(&element.key).map_err(|e| {
            error!(key = %element.key, error = %e, "Error finding key");
            StorageError::Operation(format!("error finding key {}: {}", element.key, e))
        })?;
        match value {
            Some(value) => Ok(RedisElement {
                key: element.key.clone(),
                value,
            }),
            None => {
                warn!(key = %element.key, "Key not found");
                Err(StorageError::KeyNotFound(element.key.clone()))
            }
        }
    }

    fn find_all(&self) -> StorageResult<Vec<RedisElement>> {
        let mut conn = self.connection()?;
        let keys: Vec<String> = conn.keys("*").map_err(|e| {
            error!(error = %e, "Error listing keys");
            StorageError::Operation(format!("error listing keys: {}", e))
        })?;

        let mut elements = Vec::with_capacity(keys.len());
        for key in keys {
            let value: Option<String> = conn.get(&key).map_err(|e| {
                error!(key = %key, error = %e, "Error reading key");
                StorageError::Operation(format!("error reading key {}: {}", key, e))
            })?;
            // Deleted between KEYS and GET.
            if let Some(value) = value {
                elements.push(RedisElement { key, value });
            }
        }
        Ok(elements)
    }

    fn query(&self, _query: &()) -> StorageResult<Vec<RedisElement>> {
        Err(StorageError::Unsupported("Redis does not support arbitrary queries".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_from_numbers() {
        assert_eq!(RedisElement::new("retries", 3).value, "3");
        assert_eq!(RedisElement::new("ratio", 0.5).value, "0.5");
        assert_eq!(RedisElement::key("k"), RedisElement::new("k", ""));
    }

    #[test]
    fn test_invalid_url_fails_fast() {
        let err = RedisConnector::connect_url("not-a-redis-url").unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
    }

    #[test]
    fn test_unreachable_server_fails_fast() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = RedisConnector::connect("127.0.0.1", port, 0).unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
    }

    #[test]
    fn test_query_is_unsupported() {
        // Client::open does not dial, so no server is needed.
        let connector = RedisConnector {
            client: Client::open("redis://127.0.0.1:1/").unwrap(),
        };
        let err = connector.query(&()).unwrap_err();
        assert!(matches!(err, StorageError::Unsupported(_)));
    }

    /// Connector for the server named by `REDIS_URL`, or `None` to skip.
    fn live_connector() -> Option<RedisConnector> {
        let url = std::env::var("REDIS_URL").ok()?;
        Some(RedisConnector::connect_url(&url).unwrap())
    }

    fn unique_key(name: &str) -> String {
        format!("rv16-config-test:{}:{}", std::process::id(), name)
    }

    #[test]
    fn test_live_insert_find_update_delete() {
        let Some(connector) = live_connector() else {
            return;
        };
        let key = unique_key("crud");

        connector.insert(&RedisElement::new(&key, "first")).unwrap();
        assert_eq!(connector.find(&RedisElement::key(&key)).unwrap().value, "first");

        connector.update(&RedisElement::new(&key, 2)).unwrap();
        assert_eq!(connector.find(&RedisElement::key(&key)).unwrap().value, "2");
        assert!(connector.find_all().unwrap().iter().any(|e| e.key == key));

        connector.delete(&RedisElement::key(&key)).unwrap();
        assert!(matches!(
            connector.find(&RedisElement::key(&key)),
            Err(StorageError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_live_update_missing_key_does_not_create_it() {
        let Some(connector) = live_connector() else {
            return;
        };
        let key = unique_key("missing");

        let err = connector.update(&RedisElement::new(&key, "value")).unwrap_err();
        assert!(matches!(err, StorageError::KeyNotFound(ref k) if k == &key));
        assert!(matches!(
            connector.find(&RedisElement::key(&key)),
            Err(StorageError::KeyNotFound(_))
        ));
    }
}
