//! Database repository for the dish catalog and order book.
//!
//! Uses prepared statements and transactions for data integrity. Order
//! mutations that touch line items recompute the denormalized order total
//! inside the same transaction, so a failed dish validation rolls back the
//! whole write.

use std::collections::HashMap;

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    CreateDishRequest, Dish, Order, OrderFilter, OrderLine, OrderLineRequest, OrderStatus,
    UpdateDishRequest,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== DISH OPERATIONS ====================

    /// List the whole catalog, ordered by name.
    pub async fn list_dishes(&self) -> Result<Vec<Dish>, AppError> {
        let rows = sqlx::query(
            "SELECT id, name, price_cents, amount, created_at FROM dishes ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(dish_from_row).collect())
    }

    /// Get a dish by ID.
    pub async fn get_dish(&self, id: i64) -> Result<Option<Dish>, AppError> {
        let row =
            sqlx::query("SELECT id, name, price_cents, amount, created_at FROM dishes WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.as_ref().map(dish_from_row))
    }

    /// Add a dish to the catalog.
    pub async fn create_dish(&self, request: &CreateDishRequest) -> Result<Dish, AppError> {
        let now = Utc::now().to_rfc3339();

        let result =
            sqlx::query("INSERT INTO dishes (name, price_cents, amount, created_at) VALUES (?, ?, ?, ?)")
                .bind(&request.name)
                .bind(request.price_cents)
                .bind(request.amount)
                .bind(&now)
                .execute(&self.pool)
                .await?;

        Ok(Dish {
            id: result.last_insert_rowid(),
            name: request.name.clone(),
            price_cents: request.price_cents,
            amount: request.amount,
            created_at: now,
        })
    }

    /// Update a dish. Fields absent from the request keep their current value.
    pub async fn update_dish(&self, id: i64, request: &UpdateDishRequest) -> Result<Dish, AppError> {
        let existing = self
            .get_dish(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Dish {} not found", id)))?;

        let name = request.name.as_ref().unwrap_or(&existing.name);
        let price_cents = request.price_cents.unwrap_or(existing.price_cents);
        let amount = request.amount.unwrap_or(existing.amount);

        sqlx::query("UPDATE dishes SET name = ?, price_cents = ?, amount = ? WHERE id = ?")
            .bind(name)
            .bind(price_cents)
            .bind(amount)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(Dish {
            id,
            name: name.clone(),
            price_cents,
            amount,
            created_at: existing.created_at,
        })
    }

    /// Delete a dish. Cascades into any order lines referencing it.
    pub async fn delete_dish(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM dishes WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Dish {} not found", id)));
        }

        Ok(())
    }

    // ==================== ORDER OPERATIONS ====================

    /// Create an order with its line items.
    ///
    /// Every `dish_id` is resolved against the catalog inside the
    /// transaction; an unknown dish aborts the whole write and nothing is
    /// persisted.
    pub async fn create_order(
        &self,
        table_number: i64,
        lines: &[OrderLineRequest],
    ) -> Result<Order, AppError> {
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO orders (table_number, status, total_price_cents, created_at) VALUES (?, 'pending', 0, ?)",
        )
        .bind(table_number)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        let order_id = result.last_insert_rowid();

        let (dishes, total) = insert_lines(&mut tx, order_id, lines).await?;

        sqlx::query("UPDATE orders SET total_price_cents = ? WHERE id = ?")
            .bind(total)
            .bind(order_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Order {
            id: order_id,
            table_number,
            status: OrderStatus::Pending,
            total_price_cents: total,
            dishes,
            created_at: now,
        })
    }

    /// List orders matching the filter, newest first, with line items
    /// attached in a single follow-up query.
    pub async fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, AppError> {
        let mut sql =
            String::from("SELECT id, table_number, status, total_price_cents, created_at FROM orders");
        let mut clauses = Vec::new();
        if filter.id.is_some() {
            clauses.push("id = ?");
        }
        if filter.table_number.is_some() {
            clauses.push("table_number = ?");
        }
        if filter.status.is_some() {
            clauses.push("status = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY id DESC");

        let mut query = sqlx::query(&sql);
        if let Some(id) = filter.id {
            query = query.bind(id);
        }
        if let Some(table_number) = filter.table_number {
            query = query.bind(table_number);
        }
        if let Some(status) = filter.status {
            query = query.bind(status.as_str());
        }

        let rows = query.fetch_all(&self.pool).await?;
        let mut orders: Vec<Order> = rows.iter().map(order_from_row).collect();
        self.attach_lines(&mut orders).await?;

        Ok(orders)
    }

    /// Get an order by ID, with line items.
    pub async fn get_order(&self, id: i64) -> Result<Option<Order>, AppError> {
        let row = sqlx::query(
            "SELECT id, table_number, status, total_price_cents, created_at FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut orders = vec![order_from_row(&row)];
        self.attach_lines(&mut orders).await?;
        Ok(orders.pop())
    }

    /// Change an order's status.
    pub async fn update_order_status(
        &self,
        id: i64,
        status: OrderStatus,
    ) -> Result<Order, AppError> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Order {} not found", id)));
        }

        self.get_order(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))
    }

    /// Replace all line items of an order and recompute its total.
    ///
    /// Transactional: an unknown dish leaves the previous lines and total
    /// untouched.
    pub async fn replace_order_dishes(
        &self,
        id: i64,
        lines: &[OrderLineRequest],
    ) -> Result<Order, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            "SELECT table_number, status, created_at FROM orders WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Order {} not found", id)))?;

        let table_number: i64 = row.get("table_number");
        let status_str: String = row.get("status");
        let created_at: String = row.get("created_at");

        sqlx::query("DELETE FROM order_dishes WHERE order_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let (dishes, total) = insert_lines(&mut tx, id, lines).await?;

        sqlx::query("UPDATE orders SET total_price_cents = ? WHERE id = ?")
            .bind(total)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Order {
            id,
            table_number,
            status: OrderStatus::from_str(&status_str).unwrap_or_default(),
            total_price_cents: total,
            dishes,
            created_at,
        })
    }

    /// Delete an order. Line items go with it via cascade.
    pub async fn delete_order(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Order {} not found", id)));
        }

        Ok(())
    }

    /// Sum of totals over paid orders, zero when there are none.
    pub async fn total_profit_cents(&self) -> Result<i64, AppError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(total_price_cents), 0) AS total FROM orders WHERE status = ?",
        )
        .bind(OrderStatus::Paid.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.get("total"))
    }

    /// Fetch line items for all given orders with one query and distribute
    /// them, avoiding a per-order round trip.
    async fn attach_lines(&self, orders: &mut [Order]) -> Result<(), AppError> {
        if orders.is_empty() {
            return Ok(());
        }

        let placeholders = vec!["?"; orders.len()].join(", ");
        let sql = format!(
            "SELECT od.order_id, od.dish_id, od.quantity, d.name, d.price_cents
             FROM order_dishes od
             JOIN dishes d ON d.id = od.dish_id
             WHERE od.order_id IN ({})
             ORDER BY od.id",
            placeholders
        );

        let mut query = sqlx::query(&sql);
        for order in orders.iter() {
            query = query.bind(order.id);
        }
        let rows = query.fetch_all(&self.pool).await?;

        let mut by_order: HashMap<i64, Vec<OrderLine>> = HashMap::new();
        for row in rows {
            let order_id: i64 = row.get("order_id");
            let price_cents: i64 = row.get("price_cents");
            let quantity: i64 = row.get("quantity");
            by_order.entry(order_id).or_default().push(OrderLine {
                dish_id: row.get("dish_id"),
                name: row.get("name"),
                price_cents,
                quantity,
                line_total_cents: price_cents * quantity,
            });
        }

        for order in orders.iter_mut() {
            order.dishes = by_order.remove(&order.id).unwrap_or_default();
        }

        Ok(())
    }
}

/// Resolve each requested dish against the catalog and insert the line rows,
/// returning the denormalized lines and the order total.
async fn insert_lines(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    order_id: i64,
    lines: &[OrderLineRequest],
) -> Result<(Vec<OrderLine>, i64), AppError> {
    let mut dishes = Vec::with_capacity(lines.len());
    let mut total = 0i64;

    for line in lines {
        let dish = sqlx::query("SELECT name, price_cents FROM dishes WHERE id = ?")
            .bind(line.dish_id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::Validation(format!("Unknown dish id {}", line.dish_id)))?;

        let name: String = dish.get("name");
        let price_cents: i64 = dish.get("price_cents");

        sqlx::query("INSERT INTO order_dishes (order_id, dish_id, quantity) VALUES (?, ?, ?)")
            .bind(order_id)
            .bind(line.dish_id)
            .bind(line.quantity)
            .execute(&mut **tx)
            .await?;

        let line_total_cents = price_cents * line.quantity;
        total += line_total_cents;
        dishes.push(OrderLine {
            dish_id: line.dish_id,
            name,
            price_cents,
            quantity: line.quantity,
            line_total_cents,
        });
    }

    Ok((dishes, total))
}

// Helper functions for row conversion

fn dish_from_row(row: &sqlx::sqlite::SqliteRow) -> Dish {
    Dish {
        id: row.get("id"),
        name: row.get("name"),
        price_cents: row.get("price_cents"),
        amount: row.get("amount"),
        created_at: row.get("created_at"),
    }
}

fn order_from_row(row: &sqlx::sqlite::SqliteRow) -> Order {
    let status_str: String = row.get("status");
    Order {
        id: row.get("id"),
        table_number: row.get("table_number"),
        // The CHECK constraint keeps the column within the known set
        status: OrderStatus::from_str(&status_str).unwrap_or_default(),
        total_price_cents: row.get("total_price_cents"),
        dishes: Vec::new(),
        created_at: row.get("created_at"),
    }
}
