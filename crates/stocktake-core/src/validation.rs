//! The single validation boundary in front of every write.
//!
//! Records are validated after construction or after a patch is merged, so
//! the same rules cover both paths.

use rust_decimal::Decimal;

use crate::error::{InventoryError, InventoryResult};
use crate::models::{Item, Order, Payment, Sale, Shelf};
use crate::storage::Record;

/// Largest price or amount a record may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_328, 232, 0, false, 0);

/// Largest quantity a record or a count may carry.
pub const MAX_QUANTITY: i64 = 1_000_000_000;

pub trait Validate {
    fn validate(&self) -> InventoryResult<()>;
}

fn require_name<T: Record>(name: &str) -> InventoryResult<()> {
    if name.trim().is_empty() {
        return Err(InventoryError::invalid(T::ENTITY, "name is required"));
    }
    Ok(())
}

fn require_non_negative_amount<T: Record>(field: &str, value: Decimal) -> InventoryResult<()> {
    if value < Decimal::ZERO {
        return Err(InventoryError::invalid(
            T::ENTITY,
            format!("{field} must be non-negative"),
        ));
    }
    if value > MAX_AMOUNT {
        return Err(InventoryError::invalid(
            T::ENTITY,
            format!("{field} must not exceed {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

fn require_non_negative_quantity<T: Record>(field: &str, value: i64) -> InventoryResult<()> {
    if value < 0 {
        return Err(InventoryError::invalid(
            T::ENTITY,
            format!("{field} must be non-negative"),
        ));
    }
    require_quantity_in_range(T::ENTITY, field, value)
}

/// Upper bound shared by stored records and counted quantities.
pub fn require_quantity_in_range(
    entity: &'static str,
    field: &str,
    value: i64,
) -> InventoryResult<()> {
    if value > MAX_QUANTITY {
        return Err(InventoryError::invalid(
            entity,
            format!("{field} must not exceed {MAX_QUANTITY}"),
        ));
    }
    Ok(())
}

impl Validate for Shelf {
    fn validate(&self) -> InventoryResult<()> {
        require_name::<Self>(&self.name)
    }
}

impl Validate for Item {
    fn validate(&self) -> InventoryResult<()> {
        require_name::<Self>(&self.name)?;
        require_non_negative_amount::<Self>("price", self.price)?;
        require_non_negative_quantity::<Self>("initial_quantity", self.initial_quantity)?;
        require_non_negative_quantity::<Self>("sold_quantity", self.sold_quantity)?;

        if self.sold_quantity > self.initial_quantity {
            return Err(InventoryError::invalid(
                Self::ENTITY,
                "sold_quantity cannot exceed initial_quantity",
            ));
        }
        Ok(())
    }
}

impl Validate for Order {
    fn validate(&self) -> InventoryResult<()> {
        let has_number = self
            .order_number
            .as_deref()
            .is_some_and(|number| !number.trim().is_empty());
        if self.item_id.is_none() && !has_number {
            return Err(InventoryError::invalid(
                Self::ENTITY,
                "item_id or order_number is required",
            ));
        }

        require_non_negative_quantity::<Self>("quantity", self.quantity)?;
        require_non_negative_amount::<Self>("total_amount", self.total_amount)
    }
}

impl Validate for Payment {
    fn validate(&self) -> InventoryResult<()> {
        require_non_negative_amount::<Self>("amount", self.amount)
    }
}

impl Validate for Sale {
    fn validate(&self) -> InventoryResult<()> {
        if self.quantity <= 0 {
            return Err(InventoryError::invalid(
                Self::ENTITY,
                "quantity must be positive",
            ));
        }
        require_quantity_in_range(Self::ENTITY, "quantity", self.quantity)?;
        require_non_negative_amount::<Self>("unit_price", self.unit_price)?;
        require_non_negative_amount::<Self>("total_amount", self.total_amount)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::models::{OrderStatus, PaymentMethod};

    fn item(initial_quantity: i64, sold_quantity: i64) -> Item {
        Item {
            id: Uuid::new_v4(),
            shelf_id: Uuid::new_v4(),
            name: "Bluetooth Speaker".to_string(),
            category: None,
            price: Decimal::new(1500, 2),
            initial_quantity,
            sold_quantity,
            created_at: Utc::now(),
        }
    }

    fn order(item_id: Option<Uuid>, order_number: Option<&str>) -> Order {
        Order {
            id: Uuid::new_v4(),
            item_id,
            order_number: order_number.map(str::to_string),
            quantity: 5,
            total_amount: Decimal::new(2500, 2),
            status: OrderStatus::Pending,
            is_credit: false,
            is_forgotten: false,
            customer_name: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn blank_shelf_name_is_rejected() {
        let shelf = Shelf {
            id: Uuid::new_v4(),
            name: "  ".to_string(),
            description: None,
            created_at: Utc::now(),
        };

        let err = shelf.validate().unwrap_err();
        assert!(matches!(err, InventoryError::Invalid { entity: "shelf", .. }));
    }

    #[test]
    fn item_cannot_sell_more_than_stocked() {
        assert!(item(5, 5).validate().is_ok());
        assert!(item(5, 6).validate().is_err());
        assert!(item(-1, 0).validate().is_err());
    }

    #[test]
    fn negative_price_is_rejected() {
        let mut item = item(5, 0);
        item.price = Decimal::new(-1, 0);
        assert!(item.validate().is_err());
    }

    #[test]
    fn order_needs_item_or_number() {
        assert!(order(None, None).validate().is_err());
        assert!(order(None, Some(" ")).validate().is_err());
        assert!(order(None, Some("PO-1")).validate().is_ok());
        assert!(order(Some(Uuid::new_v4()), None).validate().is_ok());
    }

    fn payment(amount: Decimal) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            amount,
            method: PaymentMethod::Cash,
            order_id: None,
            reference_number: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn payment_amount_must_be_non_negative() {
        assert!(payment(Decimal::ZERO).validate().is_ok());
        assert!(payment(Decimal::new(1250, 2)).validate().is_ok());
        assert!(payment(Decimal::new(-1, 2)).validate().is_err());
    }

    #[test]
    fn oversized_price_and_quantity_are_rejected() {
        let mut priced = item(10, 0);
        priced.price = Decimal::from_str_exact("10000000000000000000000000000").unwrap();
        assert!(matches!(
            priced.validate(),
            Err(InventoryError::Invalid { entity: "item", .. })
        ));

        priced.price = MAX_AMOUNT;
        assert!(priced.validate().is_ok());

        let stocked = item(MAX_QUANTITY + 1, 0);
        assert!(stocked.validate().is_err());
        assert!(item(MAX_QUANTITY, MAX_QUANTITY).validate().is_ok());

        assert!(payment(MAX_AMOUNT + Decimal::ONE).validate().is_err());
    }
}
