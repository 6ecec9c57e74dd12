//! Dish catalog model.

use serde::{Deserialize, Serialize};

/// A dish on the cafe menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: i64,
    pub name: String,
    /// Price per portion in cents. Monetary values never touch floats.
    pub price_cents: i64,
    /// Portions currently in stock.
    pub amount: i64,
    pub created_at: String,
}

/// Request body for adding a dish to the catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDishRequest {
    pub name: String,
    pub price_cents: i64,
    #[serde(default)]
    pub amount: i64,
}

/// Request body for updating a dish. Absent fields keep their current value.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDishRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price_cents: Option<i64>,
    #[serde(default)]
    pub amount: Option<i64>,
}
