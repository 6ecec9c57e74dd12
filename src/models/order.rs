//! Order model and its line items.

use serde::{Deserialize, Serialize};

/// Lifecycle state of an order.
///
/// The set is enforced twice: here, and by a CHECK constraint on the
/// `orders` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Ready,
    Paid,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Pending, OrderStatus::Ready, OrderStatus::Paid];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Ready => "ready",
            OrderStatus::Paid => "paid",
        }
    }

    /// Human-readable label for the staff pages.
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Ready => "Ready",
            OrderStatus::Paid => "Paid",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "ready" => Some(OrderStatus::Ready),
            "paid" => Some(OrderStatus::Paid),
            _ => None,
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

/// A dish row embedded in an order, denormalized for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub dish_id: i64,
    pub name: String,
    pub price_cents: i64,
    pub quantity: i64,
    pub line_total_cents: i64,
}

/// An order placed for a table, with its line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub table_number: i64,
    pub status: OrderStatus,
    /// Sum of `price_cents * quantity` over all line items, kept in sync
    /// with the `order_dishes` rows inside the same transaction.
    pub total_price_cents: i64,
    pub dishes: Vec<OrderLine>,
    pub created_at: String,
}

/// One dish selection in a create or replace request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    pub dish_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Request body for creating a new order.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub table_number: i64,
    pub dishes: Vec<OrderLineRequest>,
}

/// Request body for replacing an order's line items.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceDishesRequest {
    pub dishes: Vec<OrderLineRequest>,
}

/// Request body for changing an order's status.
///
/// The status arrives as a plain string so that unknown values surface as a
/// validation error rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Resolved filter set for listing orders. Absent fields are ignored.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub id: Option<i64>,
    pub table_number: Option<i64>,
    pub status: Option<OrderStatus>,
}

/// Aggregate profit over paid orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitSummary {
    pub total_profit_cents: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
        }
    }

    #[test]
    fn test_status_rejects_unknown() {
        assert_eq!(OrderStatus::from_str("cooking"), None);
        assert_eq!(OrderStatus::from_str(""), None);
        assert_eq!(OrderStatus::from_str("Pending"), None);
    }

    #[test]
    fn test_status_serde_uses_lowercase() {
        let json = serde_json::to_string(&OrderStatus::Ready).unwrap();
        assert_eq!(json, "\"ready\"");
        let parsed: OrderStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(parsed, OrderStatus::Paid);
    }
}
