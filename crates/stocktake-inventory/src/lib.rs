pub mod category;
pub mod counting;
pub mod report;
pub mod repository;
pub mod valuation;

pub use category::Category;
pub use counting::{CountEntry, CountSheet, SavedCount};
pub use report::{StocktakeReport, StocktakeRow};
pub use repository::Inventory;
pub use valuation::{ValueSummary, shelf_value, summarize};
