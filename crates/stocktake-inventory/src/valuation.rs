use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stocktake_core::Item;
use uuid::Uuid;

/// Stock value split by what was stocked, sold and is still on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValueSummary {
    pub total: Decimal,
    pub sold: Decimal,
    pub remaining: Decimal,
}

impl ValueSummary {
    pub fn add_item(&mut self, item: &Item) {
        self.total += item.price * Decimal::from(item.initial_quantity);
        self.sold += item.price * Decimal::from(item.sold_quantity);
        self.remaining += item.price * Decimal::from(item.remaining_quantity());
    }
}

pub fn summarize<'a>(items: impl IntoIterator<Item = &'a Item>) -> ValueSummary {
    items
        .into_iter()
        .fold(ValueSummary::default(), |mut summary, item| {
            summary.add_item(item);
            summary
        })
}

pub fn shelf_value(items: &[Item], shelf_id: Uuid) -> ValueSummary {
    summarize(items.iter().filter(|item| item.shelf_id == shelf_id))
}
