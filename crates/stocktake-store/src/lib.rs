pub mod collections;
pub mod file;
pub mod memory;

pub use collections::CollectionStore;
pub use file::JsonFileStore;
pub use memory::InMemoryStore;
