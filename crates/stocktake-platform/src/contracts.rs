use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stocktake_core::{Item, Shelf, StockCount, StockLine};
use stocktake_inventory::{Category, ValueSummary};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShelfView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub item_count: usize,
    pub value: ValueSummary,
    pub created_at: DateTime<Utc>,
}

impl ShelfView {
    pub fn new(shelf: Shelf, items: &[Item]) -> Self {
        let on_shelf: Vec<&Item> = items.iter().filter(|item| item.shelf_id == shelf.id).collect();
        Self {
            id: shelf.id,
            name: shelf.name,
            description: shelf.description,
            item_count: on_shelf.len(),
            value: stocktake_inventory::summarize(on_shelf),
            created_at: shelf.created_at,
        }
    }
}

/// Item as returned over HTTP, with the derived remaining quantity spelled out.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemView {
    pub id: Uuid,
    pub shelf_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub categories: Vec<Category>,
    pub price: Decimal,
    pub initial_quantity: i64,
    pub sold_quantity: i64,
    pub remaining_quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Item> for ItemView {
    fn from(item: Item) -> Self {
        Self {
            categories: Category::of(&item),
            remaining_quantity: item.remaining_quantity(),
            id: item.id,
            shelf_id: item.shelf_id,
            name: item.name,
            category: item.category,
            price: item.price,
            initial_quantity: item.initial_quantity,
            sold_quantity: item.sold_quantity,
            created_at: item.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemListQuery {
    pub shelf_id: Option<Uuid>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountedQuantity {
    pub item_id: Uuid,
    pub counted_quantity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountRequest {
    pub shelf_id: Uuid,
    pub counts: Vec<CountedQuantity>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCountResponse {
    pub count: StockCount,
    pub lines: Vec<StockLine>,
    pub total_value_difference: Decimal,
}
