//! Roll-up of saved shelf counts.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stocktake_core::{Item, Shelf, StockCount, StockLine};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StocktakeRow {
    pub count_id: Uuid,
    pub shelf_id: Uuid,
    /// `None` once the shelf has been deleted.
    pub shelf_name: Option<String>,
    pub count_date: NaiveDate,
    pub items_counted: usize,
    /// Items on the shelf now, or the counted lines if the shelf has shrunk since.
    pub total_items: usize,
    pub value_change: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StocktakeReport {
    pub rows: Vec<StocktakeRow>,
    pub total_value_change: Decimal,
    pub items_counted: usize,
    pub total_items: usize,
    /// Counted items over total items as a percentage, 0 when nothing is listed.
    pub progress: f64,
}

impl StocktakeReport {
    /// Newest counts first.
    pub fn build(
        shelves: &[Shelf],
        items: &[Item],
        counts: &[StockCount],
        lines: &[StockLine],
    ) -> Self {
        let mut newest_first: Vec<&StockCount> = counts.iter().collect();
        newest_first.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let rows: Vec<StocktakeRow> = newest_first
            .into_iter()
            .map(|count| {
                let items_counted = lines
                    .iter()
                    .filter(|line| line.stock_count_id == count.id)
                    .count();
                let on_shelf = items
                    .iter()
                    .filter(|item| item.shelf_id == count.shelf_id)
                    .count();

                StocktakeRow {
                    count_id: count.id,
                    shelf_id: count.shelf_id,
                    shelf_name: shelves
                        .iter()
                        .find(|shelf| shelf.id == count.shelf_id)
                        .map(|shelf| shelf.name.clone()),
                    count_date: count.count_date,
                    items_counted,
                    total_items: on_shelf.max(items_counted),
                    value_change: count.value_change,
                }
            })
            .collect();

        let items_counted: usize = rows.iter().map(|row| row.items_counted).sum();
        let total_items: usize = rows.iter().map(|row| row.total_items).sum();
        let progress = if total_items == 0 {
            0.0
        } else {
            items_counted as f64 / total_items as f64 * 100.0
        };

        Self {
            total_value_change: rows.iter().map(|row| row.value_change).sum(),
            items_counted,
            total_items,
            progress,
            rows,
        }
    }
}
