use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

/// Raw string key-value capability every backend provides.
///
/// Values are JSON arrays written by the collection adapter; backends never
/// interpret them.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    async fn set(&self, key: &str, value: String) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKey {
    Shelves,
    Items,
    Orders,
    Payments,
    Sales,
    StockCounts,
    StockLines,
}

impl CollectionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            CollectionKey::Shelves => "inventory_shelves",
            CollectionKey::Items => "inventory_items",
            CollectionKey::Orders => "inventory_orders",
            CollectionKey::Payments => "inventory_payments",
            CollectionKey::Sales => "inventory_sales",
            CollectionKey::StockCounts => "inventory_stock_counts",
            CollectionKey::StockLines => "inventory_stock_lines",
        }
    }
}

/// An entity persisted as one element of a keyed collection.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync {
    const COLLECTION: CollectionKey;
    const ENTITY: &'static str;

    fn id(&self) -> Uuid;
}
