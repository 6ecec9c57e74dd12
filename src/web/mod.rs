//! Server-rendered staff pages.
//!
//! Mirrors the order operations of the API as HTML forms: an order list with
//! filters, an order builder keyed off the dish catalog, and a profit
//! summary. Mutations POST and redirect back to the list, carrying the
//! active filter parameters and a flash message in the query string.

mod views;

use std::collections::HashMap;

use askama::Template;
use axum::{
    extract::{Path, Query, RawForm, RawQuery, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{OrderFilter, OrderLineRequest, OrderStatus};
use crate::AppState;
use views::{
    dish_choices, money, status_options, FilterView, OrderCreateTemplate, OrderEditTemplate,
    OrderListTemplate, OrderRow, ProfitTemplate,
};

const EMPTY_ORDER_MESSAGE: &str = "Select at least one dish with a quantity above zero";

/// GET / - The order list is the landing page.
pub async fn root() -> Redirect {
    Redirect::to("/orders")
}

/// Query parameters of the list page: the filter fields plus an optional
/// flash message left behind by a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct ListPageQuery {
    #[serde(default)]
    pub order_id: Option<String>,
    #[serde(default)]
    pub table_number: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ListPageQuery {
    /// Form inputs are free text; values that do not parse are ignored.
    fn filter(&self) -> OrderFilter {
        OrderFilter {
            id: parse_field(&self.order_id),
            table_number: parse_field(&self.table_number),
            status: self.status.as_deref().and_then(OrderStatus::from_str),
        }
    }

    /// The filter parameters alone (no flash), re-encoded for form actions
    /// and redirects.
    fn filter_query(&self) -> String {
        let mut pairs: Vec<(&str, &str)> = Vec::new();
        if let Some(v) = non_empty(&self.order_id) {
            pairs.push(("order_id", v));
        }
        if let Some(v) = non_empty(&self.table_number) {
            pairs.push(("table_number", v));
        }
        if let Some(v) = non_empty(&self.status) {
            pairs.push(("status", v));
        }
        serde_urlencoded::to_string(&pairs).unwrap_or_default()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_field(value: &Option<String>) -> Option<i64> {
    non_empty(value).and_then(|v| v.parse().ok())
}

fn render<T: Template>(template: &T) -> Result<Html<String>, AppError> {
    Ok(Html(template.render()?))
}

/// GET /orders - Order list with filters.
pub async fn order_list_page(
    State(state): State<AppState>,
    Query(query): Query<ListPageQuery>,
) -> Result<Html<String>, AppError> {
    let orders = state.repo.list_orders(&query.filter()).await?;

    let template = OrderListTemplate {
        orders: orders.iter().map(OrderRow::from_order).collect(),
        statuses: status_options(),
        filter: FilterView {
            order_id: non_empty(&query.order_id).unwrap_or_default().to_string(),
            table_number: non_empty(&query.table_number)
                .unwrap_or_default()
                .to_string(),
            status: non_empty(&query.status).unwrap_or_default().to_string(),
        },
        filter_query: query.filter_query(),
        notice: query.notice.clone().unwrap_or_default(),
        error: query.error.clone().unwrap_or_default(),
    };
    render(&template)
}

/// Decoded order form: the table number and the dish quantities the staff
/// member typed in. Zero quantities mean "not part of this order".
struct OrderForm {
    table_number: Option<i64>,
    table_number_raw: String,
    lines: Vec<OrderLineRequest>,
}

/// The order builder posts parallel `dish_id` and `quantity` fields, one
/// pair per catalog row; they are zipped back together here.
fn parse_order_form(body: &[u8]) -> Result<OrderForm, AppError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| AppError::BadRequest(format!("Malformed form body: {}", e)))?;

    let mut table_number_raw = String::new();
    let mut dish_ids = Vec::new();
    let mut quantities = Vec::new();
    for (key, value) in pairs {
        match key.as_str() {
            "table_number" => table_number_raw = value.trim().to_string(),
            "dish_id" => dish_ids.push(value.trim().parse::<i64>().ok()),
            "quantity" => quantities.push(value.trim().parse::<i64>().unwrap_or(0)),
            _ => {}
        }
    }

    let lines = dish_ids
        .into_iter()
        .zip(quantities)
        .filter_map(|(dish_id, quantity)| {
            let dish_id = dish_id?;
            (quantity > 0).then_some(OrderLineRequest { dish_id, quantity })
        })
        .collect();

    Ok(OrderForm {
        table_number: table_number_raw.parse().ok(),
        table_number_raw,
        lines,
    })
}

fn quantities_of(lines: &[OrderLineRequest]) -> HashMap<i64, i64> {
    lines.iter().map(|l| (l.dish_id, l.quantity)).collect()
}

/// GET /orders/new - Order builder form.
pub async fn order_create_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let dishes = state.repo.list_dishes().await?;
    render(&OrderCreateTemplate {
        dishes: dish_choices(&dishes, &HashMap::new()),
        table_number: String::new(),
        error: String::new(),
    })
}

/// POST /orders/new - Create the order, or re-render the form with an error.
pub async fn order_create_submit(
    State(state): State<AppState>,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    let form = parse_order_form(&body)?;

    let error = match form.table_number {
        Some(t) if t >= 1 => {
            if form.lines.is_empty() {
                Some(EMPTY_ORDER_MESSAGE)
            } else {
                None
            }
        }
        _ => Some("Enter a table number of at least 1"),
    };

    if let Some(error) = error {
        let dishes = state.repo.list_dishes().await?;
        let template = OrderCreateTemplate {
            dishes: dish_choices(&dishes, &quantities_of(&form.lines)),
            table_number: form.table_number_raw,
            error: error.to_string(),
        };
        return Ok(render(&template)?.into_response());
    }

    let table_number = form.table_number.unwrap_or(1);
    state.repo.create_order(table_number, &form.lines).await?;
    Ok(redirect_to_orders(None, "notice", "Order created").into_response())
}

/// GET /orders/:id/edit - Order builder pre-filled with the current lines.
pub async fn order_edit_page(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Html<String>, AppError> {
    let order = state
        .repo
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;
    let dishes = state.repo.list_dishes().await?;

    let quantities: HashMap<i64, i64> = order
        .dishes
        .iter()
        .map(|l| (l.dish_id, l.quantity))
        .collect();

    render(&OrderEditTemplate {
        order_id: order.id,
        table_number: order.table_number,
        dishes: dish_choices(&dishes, &quantities),
        error: String::new(),
    })
}

/// POST /orders/:id/edit - Replace the order's line items.
pub async fn order_edit_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    RawForm(body): RawForm,
) -> Result<Response, AppError> {
    let order = state
        .repo
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;
    let form = parse_order_form(&body)?;

    if form.lines.is_empty() {
        let dishes = state.repo.list_dishes().await?;
        let template = OrderEditTemplate {
            order_id: id,
            table_number: order.table_number,
            dishes: dish_choices(&dishes, &quantities_of(&form.lines)),
            error: EMPTY_ORDER_MESSAGE.to_string(),
        };
        return Ok(render(&template)?.into_response());
    }

    state.repo.replace_order_dishes(id, &form.lines).await?;
    Ok(redirect_to_orders(None, "notice", "Order updated").into_response())
}

/// POST /orders/:id/status - Form-posted status change.
///
/// The form action carries the active filter query; the redirect preserves
/// it and appends a flash message.
pub async fn order_status_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
    RawForm(body): RawForm,
) -> Result<Redirect, AppError> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed form body: {}", e)))?;
    let status = pairs
        .iter()
        .find(|(key, _)| key == "status")
        .and_then(|(_, value)| OrderStatus::from_str(value));

    let Some(status) = status else {
        return Ok(redirect_to_orders(
            query.as_deref(),
            "error",
            "Status not allowed",
        ));
    };

    match state.repo.update_order_status(id, status).await {
        Ok(_) => Ok(redirect_to_orders(
            query.as_deref(),
            "notice",
            "Status updated",
        )),
        Err(AppError::NotFound(message)) => {
            Ok(redirect_to_orders(query.as_deref(), "error", &message))
        }
        Err(e) => Err(e),
    }
}

/// POST /orders/:id/delete - Delete the order.
pub async fn order_delete_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    RawQuery(query): RawQuery,
) -> Result<Redirect, AppError> {
    match state.repo.delete_order(id).await {
        Ok(()) => Ok(redirect_to_orders(
            query.as_deref(),
            "notice",
            "Order deleted",
        )),
        Err(AppError::NotFound(message)) => {
            Ok(redirect_to_orders(query.as_deref(), "error", &message))
        }
        Err(e) => Err(e),
    }
}

/// GET /profit - Total profit over paid orders.
pub async fn profit_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let total = state.repo.total_profit_cents().await?;
    render(&ProfitTemplate {
        total: money(total),
    })
}

/// Build a redirect back to the list page, keeping the caller's filter
/// parameters and attaching a flash message.
fn redirect_to_orders(filter_query: Option<&str>, flash_key: &str, flash_text: &str) -> Redirect {
    let flash = serde_urlencoded::to_string(vec![(flash_key, flash_text)]).unwrap_or_default();
    let target = match filter_query {
        Some(q) if !q.is_empty() => format!("/orders?{}&{}", q, flash),
        _ => format!("/orders?{}", flash),
    };
    Redirect::to(&target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_form_zips_pairs() {
        let body = b"table_number=4&dish_id=1&quantity=2&dish_id=2&quantity=0&dish_id=3&quantity=1";
        let form = parse_order_form(body).unwrap();

        assert_eq!(form.table_number, Some(4));
        // The zero-quantity row is dropped
        assert_eq!(form.lines.len(), 2);
        assert_eq!(form.lines[0].dish_id, 1);
        assert_eq!(form.lines[0].quantity, 2);
        assert_eq!(form.lines[1].dish_id, 3);
        assert_eq!(form.lines[1].quantity, 1);
    }

    #[test]
    fn test_parse_order_form_ignores_junk_quantities() {
        let body = b"table_number=4&dish_id=1&quantity=abc&dish_id=2&quantity=3";
        let form = parse_order_form(body).unwrap();

        assert_eq!(form.lines.len(), 1);
        assert_eq!(form.lines[0].dish_id, 2);
    }

    #[test]
    fn test_parse_order_form_bad_table_number() {
        let body = b"table_number=abc&dish_id=1&quantity=1";
        let form = parse_order_form(body).unwrap();

        assert_eq!(form.table_number, None);
        assert_eq!(form.table_number_raw, "abc");
    }

    #[test]
    fn test_redirect_preserves_filter_query() {
        let redirect = redirect_to_orders(Some("status=pending"), "notice", "Order deleted");
        // Redirect has no public accessor for the target; re-derive it
        let response = redirect.into_response();
        let location = response
            .headers()
            .get(axum::http::header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert_eq!(location, "/orders?status=pending&notice=Order+deleted");
    }
}
