//! Shelf stocktakes: compare counted quantities against expected stock.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stocktake_core::{
    InventoryError, InventoryResult, Item, Record, StockCount, StockLine,
    require_quantity_in_range,
};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountEntry {
    pub item_id: Uuid,
    pub name: String,
    pub price: Decimal,
    /// Remaining stock according to the books when the sheet was opened.
    pub expected: i64,
    pub sold: i64,
    pub counted: Option<i64>,
}

impl CountEntry {
    pub fn is_counted(&self) -> bool {
        self.counted.is_some()
    }

    /// Counted minus expected; zero until the item is counted.
    pub fn variance(&self) -> i64 {
        self.counted.map_or(0, |counted| counted - self.expected)
    }

    pub fn value_difference(&self) -> Decimal {
        Decimal::from(self.variance()) * self.price
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountSheet {
    pub shelf_id: Uuid,
    entries: Vec<CountEntry>,
}

impl CountSheet {
    pub fn for_shelf(shelf_id: Uuid, items: &[Item]) -> Self {
        let entries = items
            .iter()
            .filter(|item| item.shelf_id == shelf_id)
            .map(|item| CountEntry {
                item_id: item.id,
                name: item.name.clone(),
                price: item.price,
                expected: item.remaining_quantity(),
                sold: item.sold_quantity,
                counted: None,
            })
            .collect();

        Self { shelf_id, entries }
    }

    pub fn entries(&self) -> &[CountEntry] {
        &self.entries
    }

    /// Sets or clears the counted quantity for one item.
    pub fn record(&mut self, item_id: Uuid, counted: Option<i64>) -> InventoryResult<()> {
        if counted.is_some_and(|quantity| quantity < 0) {
            return Err(InventoryError::invalid(
                "stock count",
                "counted quantity must be non-negative",
            ));
        }
        if let Some(quantity) = counted {
            require_quantity_in_range(StockCount::ENTITY, "counted quantity", quantity)?;
        }

        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.item_id == item_id)
            .ok_or_else(|| InventoryError::not_found("item", item_id))?;
        entry.counted = counted;
        Ok(())
    }

    pub fn counted(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_counted()).count()
    }

    pub fn uncounted(&self) -> usize {
        self.entries.len() - self.counted()
    }

    pub fn is_complete(&self) -> bool {
        self.uncounted() == 0
    }

    /// Percentage of items counted, 0 for an empty shelf.
    pub fn progress(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.counted() as f64 / self.entries.len() as f64 * 100.0
    }

    pub fn total_value_difference(&self) -> Decimal {
        self.entries.iter().map(CountEntry::value_difference).sum()
    }

    /// Builds the persisted header and lines for a finished sheet.
    pub fn finalize(
        &self,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> InventoryResult<SavedCount> {
        if !self.is_complete() {
            return Err(InventoryError::IncompleteCount {
                remaining: self.uncounted(),
            });
        }

        let count_id = Uuid::new_v4();
        let lines: Vec<StockLine> = self
            .entries
            .iter()
            .map(|entry| {
                let counted = entry.counted.unwrap_or(entry.expected);
                StockLine {
                    id: Uuid::new_v4(),
                    stock_count_id: count_id,
                    item_id: entry.item_id,
                    price: entry.price,
                    initial_qty: entry.expected,
                    sold_qty: entry.sold,
                    final_qty: counted,
                    adjustments: entry.variance(),
                    line_total: entry.price * Decimal::from(counted),
                }
            })
            .collect();

        let count = StockCount {
            id: count_id,
            shelf_id: self.shelf_id,
            count_date: now.date_naive(),
            initial_qty: lines.iter().map(|line| line.initial_qty).sum(),
            final_qty: lines.iter().map(|line| line.final_qty).sum(),
            total_value: lines.iter().map(|line| line.line_total).sum(),
            value_change: self.total_value_difference(),
            notes,
            created_at: now,
        };

        Ok(SavedCount { count, lines })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedCount {
    pub count: StockCount,
    pub lines: Vec<StockLine>,
}
