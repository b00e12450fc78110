use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use stocktake_core::{Item, Order, Payment, Sale};
use stocktake_inventory::{ValueSummary, summarize};

pub const TODAY_DAYS: i64 = 1;
pub const WEEK_DAYS: i64 = 7;
pub const MONTH_DAYS: i64 = 30;

/// Cash that should be in the till: value of sold stock minus payments made.
pub fn expected_cash(items: &[Item], payments: &[Payment]) -> Decimal {
    summarize(items).sold - total_payments(payments)
}

pub fn total_payments(payments: &[Payment]) -> Decimal {
    payments.iter().map(|payment| payment.amount).sum()
}

/// Value of every order placed, whatever its status.
pub fn total_orders(orders: &[Order]) -> Decimal {
    orders.iter().map(|order| order.total_amount).sum()
}

pub fn total_sales(sales: &[Sale]) -> Decimal {
    sales.iter().map(|sale| sale.total_amount).sum()
}

/// Sum of sales recorded within the last `days` days before `now`.
pub fn sales_by_period(sales: &[Sale], days: i64, now: DateTime<Utc>) -> Decimal {
    let cutoff = now - Duration::days(days);
    sales
        .iter()
        .filter(|sale| sale.created_at >= cutoff)
        .map(|sale| sale.total_amount)
        .sum()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub generated_at: DateTime<Utc>,
    pub items_total: usize,
    pub items_out_of_stock: usize,
    pub inventory_value: ValueSummary,
    pub orders_total: Decimal,
    pub payments_total: Decimal,
    pub expected_cash: Decimal,
    pub sales_total: Decimal,
    pub sales_today: Decimal,
    pub sales_week: Decimal,
    pub sales_month: Decimal,
}

impl DashboardSummary {
    pub fn build(
        items: &[Item],
        orders: &[Order],
        payments: &[Payment],
        sales: &[Sale],
        now: DateTime<Utc>,
    ) -> Self {
        let inventory_value = summarize(items);
        let payments_total = total_payments(payments);

        Self {
            generated_at: now,
            items_total: items.len(),
            items_out_of_stock: items
                .iter()
                .filter(|item| item.remaining_quantity() <= 0)
                .count(),
            inventory_value,
            orders_total: total_orders(orders),
            payments_total,
            expected_cash: inventory_value.sold - payments_total,
            sales_total: total_sales(sales),
            sales_today: sales_by_period(sales, TODAY_DAYS, now),
            sales_week: sales_by_period(sales, WEEK_DAYS, now),
            sales_month: sales_by_period(sales, MONTH_DAYS, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use stocktake_core::{OrderStatus, PaymentMethod};
    use uuid::Uuid;

    use super::*;

    fn item(price: i64, initial_quantity: i64, sold_quantity: i64) -> Item {
        Item {
            id: Uuid::new_v4(),
            shelf_id: Uuid::new_v4(),
            name: "Cooking Oil".to_string(),
            category: None,
            price: Decimal::from(price),
            initial_quantity,
            sold_quantity,
            created_at: Utc::now(),
        }
    }

    fn payment(amount: i64) -> Payment {
        Payment {
            id: Uuid::new_v4(),
            amount: Decimal::from(amount),
            method: PaymentMethod::Cash,
            order_id: None,
            reference_number: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn order(total: i64, status: OrderStatus) -> Order {
        Order {
            id: Uuid::new_v4(),
            item_id: None,
            order_number: Some("PO-17".to_string()),
            quantity: 1,
            total_amount: Decimal::from(total),
            status,
            is_credit: false,
            is_forgotten: false,
            customer_name: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn sale(total: i64, created_at: DateTime<Utc>) -> Sale {
        Sale {
            id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            item_name: "Cooking Oil".to_string(),
            quantity: 1,
            unit_price: Decimal::from(total),
            total_amount: Decimal::from(total),
            customer_name: None,
            notes: None,
            created_at,
        }
    }

    #[test]
    fn expected_cash_subtracts_payments_from_sold_value() {
        // 10 sold at 10 each
        let items = vec![item(10, 12, 10)];
        let payments = vec![payment(30), payment(20)];

        assert_eq!(expected_cash(&items, &payments), Decimal::from(50));
    }

    #[test]
    fn expected_cash_can_go_negative() {
        assert_eq!(expected_cash(&[], &[payment(15)]), Decimal::from(-15));
    }

    #[test]
    fn sales_by_period_uses_inclusive_cutoff() {
        let now = Utc::now();
        let sales = vec![
            sale(5, now - Duration::hours(2)),
            sale(7, now - Duration::days(1)),
            sale(11, now - Duration::days(3)),
            sale(13, now - Duration::days(40)),
        ];

        assert_eq!(sales_by_period(&sales, 1, now), Decimal::from(12));
        assert_eq!(sales_by_period(&sales, 7, now), Decimal::from(23));
        assert_eq!(sales_by_period(&sales, 30, now), Decimal::from(23));
        assert_eq!(total_sales(&sales), Decimal::from(36));
    }

    #[test]
    fn dashboard_rolls_up_everything() {
        let now = Utc::now();
        let items = vec![item(10, 5, 2), item(4, 3, 3)];
        let payments = vec![payment(12)];
        let orders = vec![order(40, OrderStatus::Pending), order(25, OrderStatus::Received)];
        let sales = vec![sale(20, now - Duration::hours(1)), sale(12, now - Duration::days(10))];

        let summary = DashboardSummary::build(&items, &orders, &payments, &sales, now);

        assert_eq!(summary.items_total, 2);
        assert_eq!(summary.items_out_of_stock, 1);
        assert_eq!(summary.inventory_value.total, Decimal::from(62));
        assert_eq!(summary.inventory_value.sold, Decimal::from(32));
        assert_eq!(summary.orders_total, Decimal::from(65));
        assert_eq!(summary.expected_cash, Decimal::from(20));
        assert_eq!(summary.sales_today, Decimal::from(20));
        assert_eq!(summary.sales_week, Decimal::from(20));
        assert_eq!(summary.sales_month, Decimal::from(32));
        assert_eq!(summary.sales_total, Decimal::from(32));
    }

    #[test]
    fn empty_dashboard_is_zeroed() {
        let summary = DashboardSummary::build(&[], &[], &[], &[], Utc::now());
        assert_eq!(summary.inventory_value, ValueSummary::default());
        assert_eq!(summary.expected_cash, Decimal::ZERO);
        assert_eq!(summary.sales_total, Decimal::ZERO);
        assert_eq!(summary.orders_total, Decimal::ZERO);
    }
}
