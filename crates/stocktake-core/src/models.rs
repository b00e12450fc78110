use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::storage::{CollectionKey, Record};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    pub shelf_id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub price: Decimal,
    pub initial_quantity: i64,
    #[serde(default)]
    pub sold_quantity: i64,
    pub created_at: DateTime<Utc>,
}

impl Item {
    /// Stock still on the shelf. Always derived, never stored.
    pub fn remaining_quantity(&self) -> i64 {
        self.initial_quantity - self.sold_quantity
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Received,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    pub quantity: i64,
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub is_credit: bool,
    #[serde(default)]
    pub is_forgotten: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Card,
    Mobile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: Uuid,
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Header of a completed shelf count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockCount {
    pub id: Uuid,
    pub shelf_id: Uuid,
    pub count_date: NaiveDate,
    pub initial_qty: i64,
    pub final_qty: i64,
    pub total_value: Decimal,
    /// Counted value minus book value across every line.
    #[serde(default)]
    pub value_change: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One counted item within a [`StockCount`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockLine {
    pub id: Uuid,
    pub stock_count_id: Uuid,
    pub item_id: Uuid,
    pub price: Decimal,
    pub initial_qty: i64,
    pub sold_qty: i64,
    pub final_qty: i64,
    pub adjustments: i64,
    pub line_total: Decimal,
}

macro_rules! record {
    ($ty:ty, $collection:expr, $entity:literal) => {
        impl Record for $ty {
            const COLLECTION: CollectionKey = $collection;
            const ENTITY: &'static str = $entity;

            fn id(&self) -> Uuid {
                self.id
            }
        }
    };
}

record!(Shelf, CollectionKey::Shelves, "shelf");
record!(Item, CollectionKey::Items, "item");
record!(Order, CollectionKey::Orders, "order");
record!(Payment, CollectionKey::Payments, "payment");
record!(Sale, CollectionKey::Sales, "sale");
record!(StockCount, CollectionKey::StockCounts, "stock count");
record!(StockLine, CollectionKey::StockLines, "stock line");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShelf {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShelfPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewItem {
    pub shelf_id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub price: Decimal,
    pub initial_quantity: i64,
    #[serde(default)]
    pub sold_quantity: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemPatch {
    pub shelf_id: Option<Uuid>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<Decimal>,
    pub initial_quantity: Option<i64>,
    pub sold_quantity: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrder {
    pub item_id: Option<Uuid>,
    pub order_number: Option<String>,
    pub quantity: i64,
    pub total_amount: Decimal,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub is_credit: bool,
    #[serde(default)]
    pub is_forgotten: bool,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPatch {
    pub quantity: Option<i64>,
    pub total_amount: Option<Decimal>,
    pub status: Option<OrderStatus>,
    pub is_credit: Option<bool>,
    pub is_forgotten: Option<bool>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPayment {
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub order_id: Option<Uuid>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentPatch {
    pub amount: Option<Decimal>,
    pub method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    pub notes: Option<String>,
}

/// A sale request. The item name and total are filled in from stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSale {
    pub item_id: Uuid,
    pub quantity: i64,
    /// Falls back to the item's shelf price.
    pub unit_price: Option<Decimal>,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SalePatch {
    pub customer_name: Option<String>,
    pub notes: Option<String>,
}

/// Trims free text and maps blank input to `None`.
pub fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Applies an optional text patch. Blank text clears the field.
fn patch_text(target: &mut Option<String>, patch: Option<String>) {
    if let Some(text) = patch {
        *target = clean_text(Some(text));
    }
}

impl ShelfPatch {
    pub fn apply(self, shelf: &mut Shelf) {
        if let Some(name) = self.name {
            shelf.name = name.trim().to_string();
        }
        patch_text(&mut shelf.description, self.description);
    }
}

impl ItemPatch {
    pub fn apply(self, item: &mut Item) {
        if let Some(shelf_id) = self.shelf_id {
            item.shelf_id = shelf_id;
        }
        if let Some(name) = self.name {
            item.name = name.trim().to_string();
        }
        patch_text(&mut item.category, self.category);
        if let Some(price) = self.price {
            item.price = price;
        }
        if let Some(initial_quantity) = self.initial_quantity {
            item.initial_quantity = initial_quantity;
        }
        if let Some(sold_quantity) = self.sold_quantity {
            item.sold_quantity = sold_quantity;
        }
    }
}

impl OrderPatch {
    pub fn apply(self, order: &mut Order) {
        if let Some(quantity) = self.quantity {
            order.quantity = quantity;
        }
        if let Some(total_amount) = self.total_amount {
            order.total_amount = total_amount;
        }
        if let Some(status) = self.status {
            order.status = status;
        }
        if let Some(is_credit) = self.is_credit {
            order.is_credit = is_credit;
        }
        if let Some(is_forgotten) = self.is_forgotten {
            order.is_forgotten = is_forgotten;
        }
        patch_text(&mut order.customer_name, self.customer_name);
        patch_text(&mut order.notes, self.notes);
    }
}

impl PaymentPatch {
    pub fn apply(self, payment: &mut Payment) {
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(method) = self.method {
            payment.method = method;
        }
        patch_text(&mut payment.reference_number, self.reference_number);
        patch_text(&mut payment.notes, self.notes);
    }
}

impl SalePatch {
    pub fn apply(self, sale: &mut Sale) {
        patch_text(&mut sale.customer_name, self.customer_name);
        patch_text(&mut sale.notes, self.notes);
    }
}
