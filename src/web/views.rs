//! Template view models for the staff pages.
//!
//! Monetary values are formatted to decimal strings here, at the display
//! edge; everything upstream stays in integer cents.

use std::collections::HashMap;

use askama::Template;

use crate::models::{Dish, Order, OrderStatus};

/// Format cents as a decimal amount, e.g. `2198` -> `"21.98"`.
pub fn money(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.abs();
    format!("{}{}.{:02}", sign, abs / 100, abs % 100)
}

/// A status choice for select boxes.
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn status_options() -> Vec<StatusOption> {
    OrderStatus::ALL
        .iter()
        .map(|s| StatusOption {
            value: s.as_str(),
            label: s.label(),
        })
        .collect()
}

/// One order line prepared for display.
pub struct LineView {
    pub quantity: i64,
    pub name: String,
    pub total: String,
}

/// One order row on the list page.
pub struct OrderRow {
    pub id: i64,
    pub table_number: i64,
    pub status: &'static str,
    pub status_label: &'static str,
    pub total: String,
    pub lines: Vec<LineView>,
}

impl OrderRow {
    pub fn from_order(order: &Order) -> Self {
        OrderRow {
            id: order.id,
            table_number: order.table_number,
            status: order.status.as_str(),
            status_label: order.status.label(),
            total: money(order.total_price_cents),
            lines: order
                .dishes
                .iter()
                .map(|line| LineView {
                    quantity: line.quantity,
                    name: line.name.clone(),
                    total: money(line.line_total_cents),
                })
                .collect(),
        }
    }
}

/// The currently applied list filters, echoed back into the filter form.
#[derive(Default)]
pub struct FilterView {
    pub order_id: String,
    pub table_number: String,
    pub status: String,
}

#[derive(Template)]
#[template(path = "order_list.html")]
pub struct OrderListTemplate {
    pub orders: Vec<OrderRow>,
    pub statuses: Vec<StatusOption>,
    pub filter: FilterView,
    /// Serialized filter parameters, appended to the mutation form actions
    /// so their redirects land back on the same filtered view.
    pub filter_query: String,
    pub notice: String,
    pub error: String,
}

/// One catalog dish in the order builder form.
pub struct DishChoice {
    pub id: i64,
    pub name: String,
    pub price: String,
    pub quantity: i64,
}

pub fn dish_choices(dishes: &[Dish], quantities: &HashMap<i64, i64>) -> Vec<DishChoice> {
    dishes
        .iter()
        .map(|dish| DishChoice {
            id: dish.id,
            name: dish.name.clone(),
            price: money(dish.price_cents),
            quantity: quantities.get(&dish.id).copied().unwrap_or(0),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "order_create.html")]
pub struct OrderCreateTemplate {
    pub dishes: Vec<DishChoice>,
    pub table_number: String,
    pub error: String,
}

#[derive(Template)]
#[template(path = "order_edit.html")]
pub struct OrderEditTemplate {
    pub order_id: i64,
    pub table_number: i64,
    pub dishes: Vec<DishChoice>,
    pub error: String,
}

#[derive(Template)]
#[template(path = "profit.html")]
pub struct ProfitTemplate {
    pub total: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(0), "0.00");
        assert_eq!(money(5), "0.05");
        assert_eq!(money(50), "0.50");
        assert_eq!(money(2198), "21.98");
        assert_eq!(money(100_000), "1000.00");
    }

    #[test]
    fn test_money_negative() {
        assert_eq!(money(-1), "-0.01");
        assert_eq!(money(-2198), "-21.98");
    }
}
