pub mod error;
pub mod models;
pub mod storage;
pub mod validation;

pub use error::{InventoryError, InventoryResult};
pub use models::{
    Item, ItemPatch, NewItem, NewOrder, NewPayment, NewSale, NewShelf, Order, OrderPatch,
    OrderStatus, Payment, PaymentMethod, PaymentPatch, Sale, SalePatch, Shelf, ShelfPatch,
    StockCount, StockLine, clean_text,
};
pub use storage::{CollectionKey, KeyValueStore, Record};
pub use validation::{MAX_AMOUNT, MAX_QUANTITY, Validate, require_quantity_in_range};
