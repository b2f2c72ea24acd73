use async_trait::async_trait;
use redis::AsyncCommands;
use rideflow_core::{KeyValueStore, StorageError};
use tracing::info;

/// Session keys in Redis, namespaced as `{prefix}:session:{key}`
#[derive(Clone)]
pub struct RedisKeyValueStore {
    client: redis::Client,
    prefix: String,
}

impl RedisKeyValueStore {
    pub fn new(connection_string: &str, prefix: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        info!("Redis session store configured with prefix '{}'", prefix);
        Ok(Self {
            client,
            prefix: prefix.to_string(),
        })
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}:session:{}", self.prefix, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StorageError::read(key, e))?;
        conn.get(self.namespaced(key))
            .await
            .map_err(|e| StorageError::read(key, e))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StorageError::write(key, e))?;
        conn.set::<_, _, ()>(self.namespaced(key), value)
            .await
            .map_err(|e| StorageError::write(key, e))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StorageError::write(key, e))?;
        conn.del::<_, ()>(self.namespaced(key))
            .await
            .map_err(|e| StorageError::write(key, e))
    }
}
