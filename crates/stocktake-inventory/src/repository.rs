use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use stocktake_core::{
    InventoryError, InventoryResult, Item, ItemPatch, KeyValueStore, NewItem, NewOrder,
    NewPayment, NewSale, NewShelf, Order, OrderPatch, Payment, PaymentPatch, Record, Sale,
    SalePatch, Shelf, ShelfPatch, StockCount, StockLine, Validate, clean_text,
};
use stocktake_store::CollectionStore;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::category::Category;
use crate::counting::{CountSheet, SavedCount};
use crate::report::StocktakeReport;
use crate::valuation::{self, ValueSummary};

/// Entity CRUD over the keyed collections.
///
/// Every write reads the whole collection, changes it and writes it back.
/// Writes through one `Inventory` are serialized; separate processes sharing
/// a backend still race with last-write-wins.
pub struct Inventory {
    collections: CollectionStore,
    write_lock: Mutex<()>,
}

impl Inventory {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            collections: CollectionStore::new(backend),
            write_lock: Mutex::new(()),
        }
    }

    async fn load<T: Record>(&self) -> InventoryResult<Vec<T>> {
        self.collections.get(T::COLLECTION).await
    }

    async fn save<T: Record>(&self, records: &[T]) -> InventoryResult<()> {
        self.collections.set(T::COLLECTION, records).await
    }

    async fn find<T: Record>(&self, id: Uuid) -> InventoryResult<T> {
        self.load::<T>()
            .await?
            .into_iter()
            .find(|record| record.id() == id)
            .ok_or_else(|| InventoryError::not_found(T::ENTITY, id))
    }

    async fn insert<T: Record + Validate>(&self, record: T) -> InventoryResult<T> {
        record.validate()?;
        let mut records = self.load::<T>().await?;
        records.push(record.clone());
        self.save(&records).await?;
        info!(entity = T::ENTITY, id = %record.id(), "created");
        Ok(record)
    }

    async fn modify<T, F>(&self, id: Uuid, change: F) -> InventoryResult<T>
    where
        T: Record + Validate,
        F: FnOnce(&mut T) + Send,
    {
        let mut records = self.load::<T>().await?;
        let slot = records
            .iter_mut()
            .find(|record| record.id() == id)
            .ok_or_else(|| InventoryError::not_found(T::ENTITY, id))?;

        let mut updated = slot.clone();
        change(&mut updated);
        updated.validate()?;
        *slot = updated.clone();

        self.save(&records).await?;
        Ok(updated)
    }

    async fn remove<T: Record>(&self, id: Uuid) -> InventoryResult<T> {
        let mut records = self.load::<T>().await?;
        let position = records
            .iter()
            .position(|record| record.id() == id)
            .ok_or_else(|| InventoryError::not_found(T::ENTITY, id))?;

        let removed = records.remove(position);
        self.save(&records).await?;
        info!(entity = T::ENTITY, %id, "deleted");
        Ok(removed)
    }

    async fn ensure_shelf(&self, shelf_id: Uuid) -> InventoryResult<()> {
        self.find::<Shelf>(shelf_id).await.map(|_| ())
    }

    pub async fn shelves(&self) -> InventoryResult<Vec<Shelf>> {
        self.load().await
    }

    pub async fn shelf(&self, id: Uuid) -> InventoryResult<Shelf> {
        self.find(id).await
    }

    pub async fn add_shelf(&self, input: NewShelf) -> InventoryResult<Shelf> {
        let _guard = self.write_lock.lock().await;
        self.insert(Shelf {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: clean_text(input.description),
            created_at: Utc::now(),
        })
        .await
    }

    pub async fn update_shelf(&self, id: Uuid, patch: ShelfPatch) -> InventoryResult<Shelf> {
        let _guard = self.write_lock.lock().await;
        self.modify(id, |shelf| patch.apply(shelf)).await
    }

    /// Removes the shelf together with every item stocked on it.
    pub async fn delete_shelf(&self, id: Uuid) -> InventoryResult<Shelf> {
        let _guard = self.write_lock.lock().await;
        let shelf = self.remove::<Shelf>(id).await?;

        let mut items = self.load::<Item>().await?;
        let before = items.len();
        items.retain(|item| item.shelf_id != id);
        if items.len() != before {
            self.save(&items).await?;
            info!(shelf_id = %id, removed = before - items.len(), "cascaded item delete");
        }

        Ok(shelf)
    }

    pub async fn items(&self) -> InventoryResult<Vec<Item>> {
        self.load().await
    }

    pub async fn item(&self, id: Uuid) -> InventoryResult<Item> {
        self.find(id).await
    }

    pub async fn items_by_shelf(&self, shelf_id: Uuid) -> InventoryResult<Vec<Item>> {
        let mut items = self.items().await?;
        items.retain(|item| item.shelf_id == shelf_id);
        Ok(items)
    }

    pub async fn items_in_category(&self, category: Category) -> InventoryResult<Vec<Item>> {
        let mut items = self.items().await?;
        items.retain(|item| category.matches(item));
        Ok(items)
    }

    pub async fn add_item(&self, input: NewItem) -> InventoryResult<Item> {
        let _guard = self.write_lock.lock().await;
        self.ensure_shelf(input.shelf_id).await?;
        self.insert(Item {
            id: Uuid::new_v4(),
            shelf_id: input.shelf_id,
            name: input.name.trim().to_string(),
            category: clean_text(input.category),
            price: input.price,
            initial_quantity: input.initial_quantity,
            sold_quantity: input.sold_quantity,
            created_at: Utc::now(),
        })
        .await
    }

    pub async fn update_item(&self, id: Uuid, patch: ItemPatch) -> InventoryResult<Item> {
        let _guard = self.write_lock.lock().await;
        if let Some(shelf_id) = patch.shelf_id {
            self.ensure_shelf(shelf_id).await?;
        }
        self.modify(id, |item| patch.apply(item)).await
    }

    pub async fn delete_item(&self, id: Uuid) -> InventoryResult<Item> {
        let _guard = self.write_lock.lock().await;
        self.remove(id).await
    }

    pub async fn orders(&self) -> InventoryResult<Vec<Order>> {
        self.load().await
    }

    pub async fn add_order(&self, input: NewOrder) -> InventoryResult<Order> {
        let _guard = self.write_lock.lock().await;
        self.insert(Order {
            id: Uuid::new_v4(),
            item_id: input.item_id,
            order_number: clean_text(input.order_number),
            quantity: input.quantity,
            total_amount: input.total_amount,
            status: input.status,
            is_credit: input.is_credit,
            is_forgotten: input.is_forgotten,
            customer_name: clean_text(input.customer_name),
            notes: clean_text(input.notes),
            created_at: Utc::now(),
        })
        .await
    }

    pub async fn update_order(&self, id: Uuid, patch: OrderPatch) -> InventoryResult<Order> {
        let _guard = self.write_lock.lock().await;
        self.modify(id, |order| patch.apply(order)).await
    }

    pub async fn delete_order(&self, id: Uuid) -> InventoryResult<Order> {
        let _guard = self.write_lock.lock().await;
        self.remove(id).await
    }

    pub async fn payments(&self) -> InventoryResult<Vec<Payment>> {
        self.load().await
    }

    pub async fn add_payment(&self, input: NewPayment) -> InventoryResult<Payment> {
        let _guard = self.write_lock.lock().await;
        self.insert(Payment {
            id: Uuid::new_v4(),
            amount: input.amount,
            method: input.method,
            order_id: input.order_id,
            reference_number: clean_text(input.reference_number),
            notes: clean_text(input.notes),
            created_at: Utc::now(),
        })
        .await
    }

    pub async fn update_payment(&self, id: Uuid, patch: PaymentPatch) -> InventoryResult<Payment> {
        let _guard = self.write_lock.lock().await;
        self.modify(id, |payment| patch.apply(payment)).await
    }

    pub async fn delete_payment(&self, id: Uuid) -> InventoryResult<Payment> {
        let _guard = self.write_lock.lock().await;
        self.remove(id).await
    }

    pub async fn sales(&self) -> InventoryResult<Vec<Sale>> {
        self.load().await
    }

    /// Records a sale against an item and moves the quantity to sold.
    ///
    /// Items are written before sales. If the sales write fails, the items
    /// collection is put back to the snapshot read at the start.
    pub async fn add_sale(&self, input: NewSale) -> InventoryResult<Sale> {
        let _guard = self.write_lock.lock().await;

        let snapshot = self.load::<Item>().await?;
        let mut items = snapshot.clone();
        let item = items
            .iter_mut()
            .find(|item| item.id == input.item_id)
            .ok_or_else(|| InventoryError::not_found(Item::ENTITY, input.item_id))?;

        let unit_price = input.unit_price.unwrap_or(item.price);
        let total_amount = unit_price
            .checked_mul(Decimal::from(input.quantity))
            .ok_or_else(|| {
                InventoryError::invalid(Sale::ENTITY, "total_amount is out of range")
            })?;
        let sale = Sale {
            id: Uuid::new_v4(),
            item_id: item.id,
            item_name: item.name.clone(),
            quantity: input.quantity,
            unit_price,
            total_amount,
            customer_name: clean_text(input.customer_name),
            notes: clean_text(input.notes),
            created_at: Utc::now(),
        };
        sale.validate()?;

        let available = item.remaining_quantity();
        if sale.quantity > available {
            return Err(InventoryError::InsufficientStock {
                item_id: item.id,
                requested: sale.quantity,
                available,
            });
        }
        item.sold_quantity += sale.quantity;

        let mut sales = self.load::<Sale>().await?;
        sales.push(sale.clone());
        self.save(&items).await?;
        if let Err(err) = self.save(&sales).await {
            if let Err(rollback) = self.save(&snapshot).await {
                error!(
                    item_id = %sale.item_id,
                    "failed to restore items after sale write: {rollback}"
                );
            }
            return Err(err);
        }

        info!(sale_id = %sale.id, item_id = %sale.item_id, quantity = sale.quantity, "sale recorded");
        Ok(sale)
    }

    pub async fn update_sale(&self, id: Uuid, patch: SalePatch) -> InventoryResult<Sale> {
        let _guard = self.write_lock.lock().await;
        self.modify(id, |sale| patch.apply(sale)).await
    }

    /// Drops the sale record. Item stock is left as it is.
    pub async fn delete_sale(&self, id: Uuid) -> InventoryResult<Sale> {
        let _guard = self.write_lock.lock().await;
        self.remove(id).await
    }

    pub async fn count_sheet(&self, shelf_id: Uuid) -> InventoryResult<CountSheet> {
        self.ensure_shelf(shelf_id).await?;
        let items = self.items().await?;
        Ok(CountSheet::for_shelf(shelf_id, &items))
    }

    /// Saves a sheet opened earlier with [`Inventory::count_sheet`].
    ///
    /// The sheet is checked against the current items first, so a sheet made
    /// stale by a sale, edit or delete is refused.
    pub async fn save_count(
        &self,
        sheet: &CountSheet,
        notes: Option<String>,
    ) -> InventoryResult<SavedCount> {
        let _guard = self.write_lock.lock().await;
        self.ensure_shelf(sheet.shelf_id).await?;

        let current = CountSheet::for_shelf(sheet.shelf_id, &self.items().await?);
        let unchanged = current.entries().len() == sheet.entries().len()
            && current.entries().iter().zip(sheet.entries()).all(|(now, then)| {
                now.item_id == then.item_id
                    && now.expected == then.expected
                    && now.sold == then.sold
                    && now.price == then.price
            });
        if !unchanged {
            return Err(InventoryError::invalid(
                StockCount::ENTITY,
                "shelf stock changed since the count sheet was opened",
            ));
        }

        self.persist_count(sheet, notes).await
    }

    /// Opens, fills and saves a count in one step against the current items.
    pub async fn record_count(
        &self,
        shelf_id: Uuid,
        counts: impl IntoIterator<Item = (Uuid, Option<i64>)>,
        notes: Option<String>,
    ) -> InventoryResult<SavedCount> {
        let _guard = self.write_lock.lock().await;
        self.ensure_shelf(shelf_id).await?;

        let mut sheet = CountSheet::for_shelf(shelf_id, &self.items().await?);
        for (item_id, counted) in counts {
            sheet.record(item_id, counted)?;
        }

        self.persist_count(&sheet, notes).await
    }

    async fn persist_count(
        &self,
        sheet: &CountSheet,
        notes: Option<String>,
    ) -> InventoryResult<SavedCount> {
        let saved = sheet.finalize(clean_text(notes), Utc::now())?;

        let mut counts = self.load::<StockCount>().await?;
        counts.push(saved.count.clone());
        let mut lines = self.load::<StockLine>().await?;
        lines.extend(saved.lines.iter().cloned());

        self.save(&counts).await?;
        self.save(&lines).await?;

        info!(
            count_id = %saved.count.id,
            shelf_id = %saved.count.shelf_id,
            lines = saved.lines.len(),
            "stock count saved"
        );
        Ok(saved)
    }

    pub async fn stock_counts(&self) -> InventoryResult<Vec<StockCount>> {
        self.load().await
    }

    pub async fn stock_lines(&self, count_id: Uuid) -> InventoryResult<Vec<StockLine>> {
        self.find::<StockCount>(count_id).await?;
        let mut lines = self.load::<StockLine>().await?;
        lines.retain(|line| line.stock_count_id == count_id);
        Ok(lines)
    }

    pub async fn shelf_value(&self, shelf_id: Uuid) -> InventoryResult<ValueSummary> {
        self.ensure_shelf(shelf_id).await?;
        let items = self.items().await?;
        Ok(valuation::shelf_value(&items, shelf_id))
    }

    pub async fn total_inventory_value(&self) -> InventoryResult<ValueSummary> {
        let items = self.items().await?;
        Ok(valuation::summarize(&items))
    }

    pub async fn stocktake_report(&self) -> InventoryResult<StocktakeReport> {
        let shelves = self.shelves().await?;
        let items = self.items().await?;
        let counts = self.stock_counts().await?;
        let lines = self.load::<StockLine>().await?;
        Ok(StocktakeReport::build(&shelves, &items, &counts, &lines))
    }
}
