use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use stocktake_core::{CollectionKey, InventoryResult, KeyValueStore};
use tracing::warn;

/// Typed view over a [`KeyValueStore`]: one JSON array per collection key.
///
/// Absent and malformed collections both read as empty. Malformed data is
/// logged and otherwise dropped; backend failures are returned to the caller.
#[derive(Clone)]
pub struct CollectionStore {
    backend: Arc<dyn KeyValueStore>,
}

impl CollectionStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: CollectionKey) -> InventoryResult<Vec<T>> {
        let Some(raw) = self.backend.get(key.as_str()).await? else {
            return Ok(Vec::new());
        };

        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                warn!(
                    collection = key.as_str(),
                    "discarding malformed collection: {err}"
                );
                Ok(Vec::new())
            }
        }
    }

    pub async fn set<T: Serialize>(&self, key: CollectionKey, records: &[T]) -> InventoryResult<()> {
        let serialized = serde_json::to_string(records).map_err(anyhow::Error::from)?;
        self.backend.set(key.as_str(), serialized).await?;
        Ok(())
    }
}
