pub mod backend;
pub mod config;
pub mod contracts;
pub mod db;
pub mod redis_store;

pub use backend::open_store;
pub use config::{ServiceConfig, StoreBackend};
pub use contracts::{
    CountRequest, CountedQuantity, ItemListQuery, ItemView, SavedCountResponse, ShelfView,
};
pub use db::{PostgresStore, connect_database};
pub use redis_store::RedisStore;
