use anyhow::Result;
use async_trait::async_trait;
use redis::{AsyncCommands, Client};
use stocktake_core::KeyValueStore;

/// Hosted backend storing each collection under `<owner>:<key>`.
#[derive(Clone)]
pub struct RedisStore {
    client: Client,
    owner_id: String,
}

impl RedisStore {
    pub fn connect(redis_url: &str, owner_id: impl Into<String>) -> Result<Self> {
        let client = Client::open(redis_url)?;
        Ok(Self {
            client,
            owner_id: owner_id.into(),
        })
    }

    fn scoped_key(&self, key: &str) -> String {
        format!("{}:{}", self.owner_id, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut connection = self.client.get_multiplexed_async_connection().await?;
        let value: Option<String> = connection.get(self.scoped_key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut connection = self.client.get_multiplexed_async_connection().await?;
        let _: () = connection.set(self.scoped_key(key), value).await?;
        Ok(())
    }
}
