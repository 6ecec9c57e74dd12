//! Order API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{
    CreateOrderRequest, Order, OrderFilter, OrderLineRequest, OrderStatus, ProfitSummary,
    ReplaceDishesRequest, UpdateStatusRequest,
};
use crate::AppState;

/// Query parameters accepted by the order list endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOrdersQuery {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub table_number: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ListOrdersQuery {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        let status = self.status.as_deref().map(parse_status).transpose()?;
        Ok(OrderFilter {
            id: self.id,
            table_number: self.table_number,
            status,
        })
    }
}

fn parse_status(s: &str) -> Result<OrderStatus, AppError> {
    OrderStatus::from_str(s)
        .ok_or_else(|| AppError::Validation(format!("Status not allowed: {}", s)))
}

fn validate_lines(lines: &[OrderLineRequest]) -> Result<(), AppError> {
    if lines.is_empty() {
        return Err(AppError::Validation(
            "At least one dish is required".to_string(),
        ));
    }
    for line in lines {
        if line.quantity < 1 {
            return Err(AppError::Validation(format!(
                "Quantity must be at least 1 for dish id {}",
                line.dish_id
            )));
        }
    }
    Ok(())
}

/// GET /api/orders - List orders matching the optional filters.
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> ApiResult<Vec<Order>> {
    let filter = query.into_filter()?;
    let orders = state.repo.list_orders(&filter).await?;
    success(orders)
}

/// POST /api/orders - Create a new order.
pub async fn create_order(
    State(state): State<AppState>,
    Json(request): Json<CreateOrderRequest>,
) -> ApiResult<Order> {
    if request.table_number < 1 {
        return Err(AppError::Validation(
            "Table number must be at least 1".to_string(),
        ));
    }
    validate_lines(&request.dishes)?;

    let order = state
        .repo
        .create_order(request.table_number, &request.dishes)
        .await?;
    success(order)
}

/// GET /api/orders/:id - Get a single order with its line items.
pub async fn get_order(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Order> {
    match state.repo.get_order(id).await? {
        Some(order) => success(order),
        None => Err(AppError::NotFound(format!("Order {} not found", id))),
    }
}

/// PATCH /api/orders/:id/status - Change an order's status.
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateStatusRequest>,
) -> ApiResult<Order> {
    let status = parse_status(&request.status)?;
    let order = state.repo.update_order_status(id, status).await?;
    success(order)
}

/// PUT /api/orders/:id/dishes - Replace an order's line items.
pub async fn replace_order_dishes(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<ReplaceDishesRequest>,
) -> ApiResult<Order> {
    validate_lines(&request.dishes)?;
    let order = state.repo.replace_order_dishes(id, &request.dishes).await?;
    success(order)
}

/// DELETE /api/orders/:id - Delete an order.
pub async fn delete_order(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.repo.delete_order(id).await?;
    success(())
}

/// GET /api/orders/profit - Total profit over paid orders.
pub async fn total_profit(State(state): State<AppState>) -> ApiResult<ProfitSummary> {
    let total_profit_cents = state.repo.total_profit_cents().await?;
    success(ProfitSummary { total_profit_cents })
}
