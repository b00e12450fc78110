use std::sync::Arc;

use anyhow::Result;
use stocktake_core::KeyValueStore;
use stocktake_store::{InMemoryStore, JsonFileStore};
use tracing::info;

use crate::config::{ServiceConfig, StoreBackend};
use crate::db::{PostgresStore, connect_database};
use crate::redis_store::RedisStore;

pub async fn open_store(config: &ServiceConfig) -> Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match &config.backend {
        StoreBackend::Memory => {
            info!("using in-memory store");
            Arc::new(InMemoryStore::new())
        }
        StoreBackend::File { data_dir } => {
            info!("using file store at {}", data_dir.display());
            Arc::new(JsonFileStore::open(data_dir.clone()).await?)
        }
        StoreBackend::Redis { redis_url } => {
            info!(owner_id = %config.owner_id, "using redis store");
            Arc::new(RedisStore::connect(redis_url, config.owner_id.clone())?)
        }
        StoreBackend::Postgres { database_url } => {
            info!(owner_id = %config.owner_id, "using postgres store");
            let pool = connect_database(database_url).await?;
            let store = PostgresStore::new(pool, config.owner_id.clone());
            store.ensure_schema().await?;
            Arc::new(store)
        }
    };

    Ok(store)
}
