use std::{net::SocketAddr, sync::Arc};

use anyhow::Result as AnyResult;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use chrono::Utc;
use stocktake_core::{
    InventoryError, ItemPatch, NewItem, NewOrder, NewPayment, NewSale, NewShelf, Order,
    OrderPatch, Payment, PaymentPatch, Sale, SalePatch, ShelfPatch, StockCount, StockLine,
};
use stocktake_finance::DashboardSummary;
use stocktake_inventory::{Category, CountSheet, Inventory, StocktakeReport, ValueSummary};
use stocktake_platform::{
    CountRequest, ItemListQuery, ItemView, SavedCountResponse, ServiceConfig, ShelfView,
    open_store,
};
use tracing::{error, info};
use uuid::Uuid;

#[derive(Clone)]
struct AppState {
    inventory: Arc<Inventory>,
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "stocktake_gateway=info,stocktake_inventory=info".to_string()),
        )
        .init();

    let config = ServiceConfig::from_env("0.0.0.0:8080")?;
    let store = open_store(&config).await?;

    let state = AppState {
        inventory: Arc::new(Inventory::new(store)),
    };
    let router = router(state);

    let addr: SocketAddr = config.http_addr.parse()?;
    info!("gateway listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/shelves", get(list_shelves).post(create_shelf))
        .route(
            "/shelves/{shelf_id}",
            patch(update_shelf).delete(delete_shelf),
        )
        .route("/shelves/{shelf_id}/items", get(list_shelf_items))
        .route("/shelves/{shelf_id}/value", get(shelf_value))
        .route("/shelves/{shelf_id}/count-sheet", get(count_sheet))
        .route("/items", get(list_items).post(create_item))
        .route("/items/{item_id}", patch(update_item).delete(delete_item))
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{order_id}",
            patch(update_order).delete(delete_order),
        )
        .route("/payments", get(list_payments).post(create_payment))
        .route(
            "/payments/{payment_id}",
            patch(update_payment).delete(delete_payment),
        )
        .route("/sales", get(list_sales).post(create_sale))
        .route("/sales/{sale_id}", patch(update_sale).delete(delete_sale))
        .route("/counts", get(list_counts).post(create_count))
        .route("/counts/{count_id}/lines", get(list_count_lines))
        .route("/reports/inventory-value", get(inventory_value))
        .route("/reports/summary", get(report_summary))
        .route("/reports/stocktakes", get(report_stocktakes))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_shelves(
    State(state): State<AppState>,
) -> Result<Json<Vec<ShelfView>>, (StatusCode, String)> {
    let shelves = state.inventory.shelves().await.map_err(inventory_error)?;
    let items = state.inventory.items().await.map_err(inventory_error)?;

    Ok(Json(
        shelves
            .into_iter()
            .map(|shelf| ShelfView::new(shelf, &items))
            .collect(),
    ))
}

async fn create_shelf(
    State(state): State<AppState>,
    Json(payload): Json<NewShelf>,
) -> Result<(StatusCode, Json<ShelfView>), (StatusCode, String)> {
    let shelf = state
        .inventory
        .add_shelf(payload)
        .await
        .map_err(inventory_error)?;

    Ok((StatusCode::CREATED, Json(ShelfView::new(shelf, &[]))))
}

async fn update_shelf(
    State(state): State<AppState>,
    Path(shelf_id): Path<Uuid>,
    Json(payload): Json<ShelfPatch>,
) -> Result<Json<ShelfView>, (StatusCode, String)> {
    let shelf = state
        .inventory
        .update_shelf(shelf_id, payload)
        .await
        .map_err(inventory_error)?;
    let items = state.inventory.items().await.map_err(inventory_error)?;

    Ok(Json(ShelfView::new(shelf, &items)))
}

async fn delete_shelf(
    State(state): State<AppState>,
    Path(shelf_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .inventory
        .delete_shelf(shelf_id)
        .await
        .map_err(inventory_error)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_shelf_items(
    State(state): State<AppState>,
    Path(shelf_id): Path<Uuid>,
) -> Result<Json<Vec<ItemView>>, (StatusCode, String)> {
    state
        .inventory
        .shelf(shelf_id)
        .await
        .map_err(inventory_error)?;
    let items = state
        .inventory
        .items_by_shelf(shelf_id)
        .await
        .map_err(inventory_error)?;

    Ok(Json(items.into_iter().map(ItemView::from).collect()))
}

async fn shelf_value(
    State(state): State<AppState>,
    Path(shelf_id): Path<Uuid>,
) -> Result<Json<ValueSummary>, (StatusCode, String)> {
    let value = state
        .inventory
        .shelf_value(shelf_id)
        .await
        .map_err(inventory_error)?;

    Ok(Json(value))
}

async fn count_sheet(
    State(state): State<AppState>,
    Path(shelf_id): Path<Uuid>,
) -> Result<Json<CountSheet>, (StatusCode, String)> {
    let sheet = state
        .inventory
        .count_sheet(shelf_id)
        .await
        .map_err(inventory_error)?;

    Ok(Json(sheet))
}

async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<ItemListQuery>,
) -> Result<Json<Vec<ItemView>>, (StatusCode, String)> {
    let category = query
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|err| (StatusCode::BAD_REQUEST, err))?;

    let mut items = match category {
        Some(category) => state.inventory.items_in_category(category).await,
        None => state.inventory.items().await,
    }
    .map_err(inventory_error)?;

    if let Some(shelf_id) = query.shelf_id {
        items.retain(|item| item.shelf_id == shelf_id);
    }

    Ok(Json(items.into_iter().map(ItemView::from).collect()))
}

async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<NewItem>,
) -> Result<(StatusCode, Json<ItemView>), (StatusCode, String)> {
    let item = state
        .inventory
        .add_item(payload)
        .await
        .map_err(inventory_error)?;

    Ok((StatusCode::CREATED, Json(item.into())))
}

async fn update_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
    Json(payload): Json<ItemPatch>,
) -> Result<Json<ItemView>, (StatusCode, String)> {
    let item = state
        .inventory
        .update_item(item_id, payload)
        .await
        .map_err(inventory_error)?;

    Ok(Json(item.into()))
}

async fn delete_item(
    State(state): State<AppState>,
    Path(item_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .inventory
        .delete_item(item_id)
        .await
        .map_err(inventory_error)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, (StatusCode, String)> {
    let orders = state.inventory.orders().await.map_err(inventory_error)?;
    Ok(Json(orders))
}

async fn create_order(
    State(state): State<AppState>,
    Json(payload): Json<NewOrder>,
) -> Result<(StatusCode, Json<Order>), (StatusCode, String)> {
    let order = state
        .inventory
        .add_order(payload)
        .await
        .map_err(inventory_error)?;

    Ok((StatusCode::CREATED, Json(order)))
}

async fn update_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<OrderPatch>,
) -> Result<Json<Order>, (StatusCode, String)> {
    let order = state
        .inventory
        .update_order(order_id, payload)
        .await
        .map_err(inventory_error)?;

    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .inventory
        .delete_order(order_id)
        .await
        .map_err(inventory_error)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Payment>>, (StatusCode, String)> {
    let payments = state.inventory.payments().await.map_err(inventory_error)?;
    Ok(Json(payments))
}

async fn create_payment(
    State(state): State<AppState>,
    Json(payload): Json<NewPayment>,
) -> Result<(StatusCode, Json<Payment>), (StatusCode, String)> {
    let payment = state
        .inventory
        .add_payment(payload)
        .await
        .map_err(inventory_error)?;

    Ok((StatusCode::CREATED, Json(payment)))
}

async fn update_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
    Json(payload): Json<PaymentPatch>,
) -> Result<Json<Payment>, (StatusCode, String)> {
    let payment = state
        .inventory
        .update_payment(payment_id, payload)
        .await
        .map_err(inventory_error)?;

    Ok(Json(payment))
}

async fn delete_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .inventory
        .delete_payment(payment_id)
        .await
        .map_err(inventory_error)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_sales(
    State(state): State<AppState>,
) -> Result<Json<Vec<Sale>>, (StatusCode, String)> {
    let sales = state.inventory.sales().await.map_err(inventory_error)?;
    Ok(Json(sales))
}

async fn create_sale(
    State(state): State<AppState>,
    Json(payload): Json<NewSale>,
) -> Result<(StatusCode, Json<Sale>), (StatusCode, String)> {
    let sale = state
        .inventory
        .add_sale(payload)
        .await
        .map_err(inventory_error)?;

    Ok((StatusCode::CREATED, Json(sale)))
}

async fn update_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
    Json(payload): Json<SalePatch>,
) -> Result<Json<Sale>, (StatusCode, String)> {
    let sale = state
        .inventory
        .update_sale(sale_id, payload)
        .await
        .map_err(inventory_error)?;

    Ok(Json(sale))
}

async fn delete_sale(
    State(state): State<AppState>,
    Path(sale_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .inventory
        .delete_sale(sale_id)
        .await
        .map_err(inventory_error)?;

    Ok(StatusCode::NO_CONTENT)
}

async fn list_counts(
    State(state): State<AppState>,
) -> Result<Json<Vec<StockCount>>, (StatusCode, String)> {
    let counts = state
        .inventory
        .stock_counts()
        .await
        .map_err(inventory_error)?;
    Ok(Json(counts))
}

async fn create_count(
    State(state): State<AppState>,
    Json(payload): Json<CountRequest>,
) -> Result<(StatusCode, Json<SavedCountResponse>), (StatusCode, String)> {
    let counts = payload
        .counts
        .into_iter()
        .map(|entry| (entry.item_id, entry.counted_quantity));
    let saved = state
        .inventory
        .record_count(payload.shelf_id, counts, payload.notes)
        .await
        .map_err(inventory_error)?;

    let response = SavedCountResponse {
        total_value_difference: saved.count.value_change,
        count: saved.count,
        lines: saved.lines,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_count_lines(
    State(state): State<AppState>,
    Path(count_id): Path<Uuid>,
) -> Result<Json<Vec<StockLine>>, (StatusCode, String)> {
    let lines = state
        .inventory
        .stock_lines(count_id)
        .await
        .map_err(inventory_error)?;
    Ok(Json(lines))
}

async fn inventory_value(
    State(state): State<AppState>,
) -> Result<Json<ValueSummary>, (StatusCode, String)> {
    let value = state
        .inventory
        .total_inventory_value()
        .await
        .map_err(inventory_error)?;
    Ok(Json(value))
}

async fn report_summary(
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, (StatusCode, String)> {
    let items = state.inventory.items().await.map_err(inventory_error)?;
    let orders = state.inventory.orders().await.map_err(inventory_error)?;
    let payments = state.inventory.payments().await.map_err(inventory_error)?;
    let sales = state.inventory.sales().await.map_err(inventory_error)?;

    Ok(Json(DashboardSummary::build(
        &items,
        &orders,
        &payments,
        &sales,
        Utc::now(),
    )))
}

async fn report_stocktakes(
    State(state): State<AppState>,
) -> Result<Json<StocktakeReport>, (StatusCode, String)> {
    let report = state
        .inventory
        .stocktake_report()
        .await
        .map_err(inventory_error)?;
    Ok(Json(report))
}

fn inventory_error(err: InventoryError) -> (StatusCode, String) {
    match err {
        InventoryError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
        InventoryError::Invalid { .. }
        | InventoryError::InsufficientStock { .. }
        | InventoryError::IncompleteCount { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        InventoryError::Storage(_) => {
            error!("storage failure: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "storage unavailable".to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use http_body_util::BodyExt;
    use rust_decimal::Decimal;
    use serde_json::{Value, json};
    use stocktake_store::InMemoryStore;
    use tower::ServiceExt;

    use super::*;

    fn app() -> Router {
        router(AppState {
            inventory: Arc::new(Inventory::new(Arc::new(InMemoryStore::new()))),
        })
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, value)
    }

    #[tokio::test]
    async fn healthz_reports_ok() {
        let (status, body) = send(&app(), "GET", "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, Value::String("ok".to_string()));
    }

    #[tokio::test]
    async fn sale_flow_updates_summary() {
        let app = app();

        let (status, shelf) = send(&app, "POST", "/shelves", Some(json!({ "name": "Left Shelf" }))).await;
        assert_eq!(status, StatusCode::CREATED);
        let shelf_id = shelf["id"].as_str().unwrap().to_string();

        let (status, item) = send(
            &app,
            "POST",
            "/items",
            Some(json!({
                "shelf_id": shelf_id,
                "name": "Bluetooth Speaker",
                "price": "10",
                "initial_quantity": 5
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(item["remaining_quantity"], 5);
        let item_id = item["id"].as_str().unwrap().to_string();

        let (status, _) = send(
            &app,
            "POST",
            "/sales",
            Some(json!({ "item_id": item_id, "quantity": 2 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(
            &app,
            "POST",
            "/payments",
            Some(json!({ "amount": "5", "method": "cash" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, summary) = send(&app, "GET", "/reports/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        let expected_cash: Decimal = summary["expected_cash"].as_str().unwrap().parse().unwrap();
        assert_eq!(expected_cash, Decimal::from(15));
        let sales_today: Decimal = summary["sales_today"].as_str().unwrap().parse().unwrap();
        assert_eq!(sales_today, Decimal::from(20));
        assert_eq!(summary["orders_total"], "0");

        let (status, value) = send(&app, "GET", &format!("/shelves/{shelf_id}/value"), None).await;
        assert_eq!(status, StatusCode::OK);
        let remaining: Decimal = value["remaining"].as_str().unwrap().parse().unwrap();
        assert_eq!(remaining, Decimal::from(30));
    }

    #[tokio::test]
    async fn oversold_sale_is_bad_request() {
        let app = app();
        let (_, shelf) = send(&app, "POST", "/shelves", Some(json!({ "name": "Big Deep" }))).await;
        let (_, item) = send(
            &app,
            "POST",
            "/items",
            Some(json!({
                "shelf_id": shelf["id"],
                "name": "Notebook Set",
                "price": "12.50",
                "initial_quantity": 1
            })),
        )
        .await;

        let (status, _) = send(
            &app,
            "POST",
            "/sales",
            Some(json!({ "item_id": item["id"], "quantity": 3 })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let app = app();
        let missing = Uuid::new_v4();

        let (status, _) = send(&app, "DELETE", &format!("/items/{missing}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            "PATCH",
            &format!("/shelves/{missing}"),
            Some(json!({ "name": "Renamed" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn shelf_delete_cascades_over_http() {
        let app = app();
        let (_, shelf) = send(&app, "POST", "/shelves", Some(json!({ "name": "Center Rack" }))).await;
        let shelf_id = shelf["id"].as_str().unwrap().to_string();
        send(
            &app,
            "POST",
            "/items",
            Some(json!({
                "shelf_id": shelf_id,
                "name": "Jeans",
                "price": "59.99",
                "initial_quantity": 25
            })),
        )
        .await;

        let (status, _) = send(&app, "DELETE", &format!("/shelves/{shelf_id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, items) = send(&app, "GET", "/items", None).await;
        assert_eq!(items, json!([]));
    }

    #[tokio::test]
    async fn count_submission_records_variance() {
        let app = app();
        let (_, shelf) = send(&app, "POST", "/shelves", Some(json!({ "name": "Storage Room" }))).await;
        let (_, item) = send(
            &app,
            "POST",
            "/items",
            Some(json!({
                "shelf_id": shelf["id"],
                "name": "Rice 5kg",
                "price": "4",
                "initial_quantity": 10
            })),
        )
        .await;

        let (status, _) = send(
            &app,
            "POST",
            "/counts",
            Some(json!({ "shelf_id": shelf["id"], "counts": [], "notes": null })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, saved) = send(
            &app,
            "POST",
            "/counts",
            Some(json!({
                "shelf_id": shelf["id"],
                "counts": [{ "item_id": item["id"], "counted_quantity": 8 }],
                "notes": "weekly"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let difference: Decimal = saved["total_value_difference"]
            .as_str()
            .unwrap()
            .parse()
            .unwrap();
        assert_eq!(difference, Decimal::from(-8));

        let count_id = saved["count"]["id"].as_str().unwrap();
        let (status, lines) = send(&app, "GET", &format!("/counts/{count_id}/lines"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(lines.as_array().unwrap().len(), 1);

        let (status, report) = send(&app, "GET", "/reports/stocktakes", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["rows"][0]["shelf_name"], "Storage Room");
        assert_eq!(report["rows"][0]["value_change"], "-8");
        assert_eq!(report["progress"], 100.0);
    }

    #[tokio::test]
    async fn count_uses_stock_after_earlier_sale() {
        let app = app();
        let (_, shelf) = send(&app, "POST", "/shelves", Some(json!({ "name": "Left Shelf" }))).await;
        let (_, item) = send(
            &app,
            "POST",
            "/items",
            Some(json!({
                "shelf_id": shelf["id"],
                "name": "Wireless Headphones",
                "price": "20",
                "initial_quantity": 15
            })),
        )
        .await;
        send(
            &app,
            "POST",
            "/sales",
            Some(json!({ "item_id": item["id"], "quantity": 5 })),
        )
        .await;

        let (status, saved) = send(
            &app,
            "POST",
            "/counts",
            Some(json!({
                "shelf_id": shelf["id"],
                "counts": [{ "item_id": item["id"], "counted_quantity": 10 }],
                "notes": null
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(saved["lines"][0]["initial_qty"], 10);
        assert_eq!(saved["lines"][0]["adjustments"], 0);
        assert_eq!(saved["total_value_difference"], "0");

        let (status, _) = send(
            &app,
            "POST",
            "/counts",
            Some(json!({
                "shelf_id": shelf["id"],
                "counts": [{ "item_id": item["id"], "counted_quantity": i64::MAX }],
                "notes": null
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn items_filter_by_category() {
        let app = app();
        let (_, shelf) = send(&app, "POST", "/shelves", Some(json!({ "name": "Storage Room" }))).await;
        for name in ["Orange Juice", "Gaming Keyboard"] {
            send(
                &app,
                "POST",
                "/items",
                Some(json!({
                    "shelf_id": shelf["id"],
                    "name": name,
                    "price": "1",
                    "initial_quantity": 1
                })),
            )
            .await;
        }

        let (status, gadgets) = send(&app, "GET", "/items?category=gadgets", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(gadgets.as_array().unwrap().len(), 1);
        assert_eq!(gadgets[0]["name"], "Gaming Keyboard");

        let (status, _) = send(&app, "GET", "/items?category=toys", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
