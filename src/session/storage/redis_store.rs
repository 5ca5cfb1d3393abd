use std::sync::Arc;

use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::LocalStorage;
use crate::error::Result;
use crate::session::keys::namespaced_key;

/// 会话存到 Redis，多个进程（例如多台运维机器）共享同一个后台会话
#[derive(Clone)]
pub struct RedisStorage {
    redis: Arc<RedisClient>,
    namespace: String,
}

impl RedisStorage {
    pub fn new(redis: Arc<RedisClient>, namespace: impl Into<String>) -> Self {
        Self {
            redis,
            namespace: namespace.into(),
        }
    }

    pub fn open(redis_url: &str, namespace: impl Into<String>) -> Result<Self> {
        let client = RedisClient::open(redis_url)?;
        Ok(Self::new(Arc::new(client), namespace))
    }
}

#[async_trait]
impl LocalStorage for RedisStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let value: Option<String> = conn.get(namespaced_key(&self.namespace, key)).await?;
        Ok(value)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let _: () = conn.set(namespaced_key(&self.namespace, key), value).await?;
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut conn = self.redis.get_multiplexed_async_connection().await?;

        let _: () = conn.del(namespaced_key(&self.namespace, key)).await?;
        Ok(())
    }
}
