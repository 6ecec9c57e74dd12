//! Dish catalog API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{success, ApiResult};
use crate::errors::AppError;
use crate::models::{CreateDishRequest, Dish, UpdateDishRequest};
use crate::AppState;

/// GET /api/dishes - List the dish catalog.
pub async fn list_dishes(State(state): State<AppState>) -> ApiResult<Vec<Dish>> {
    let dishes = state.repo.list_dishes().await?;
    success(dishes)
}

/// GET /api/dishes/:id - Get a single dish.
pub async fn get_dish(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Dish> {
    match state.repo.get_dish(id).await? {
        Some(dish) => success(dish),
        None => Err(AppError::NotFound(format!("Dish {} not found", id))),
    }
}

/// POST /api/dishes - Add a dish to the catalog.
pub async fn create_dish(
    State(state): State<AppState>,
    Json(request): Json<CreateDishRequest>,
) -> ApiResult<Dish> {
    if request.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if request.price_cents < 0 {
        return Err(AppError::Validation(
            "Price must not be negative".to_string(),
        ));
    }
    if request.amount < 0 {
        return Err(AppError::Validation(
            "Amount must not be negative".to_string(),
        ));
    }

    let dish = state.repo.create_dish(&request).await?;
    success(dish)
}

/// PUT /api/dishes/:id - Update a dish.
pub async fn update_dish(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(request): Json<UpdateDishRequest>,
) -> ApiResult<Dish> {
    if let Some(name) = &request.name {
        if name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
    }
    if request.price_cents.is_some_and(|p| p < 0) {
        return Err(AppError::Validation(
            "Price must not be negative".to_string(),
        ));
    }
    if request.amount.is_some_and(|a| a < 0) {
        return Err(AppError::Validation(
            "Amount must not be negative".to_string(),
        ));
    }

    let dish = state.repo.update_dish(id, &request).await?;
    success(dish)
}

/// DELETE /api/dishes/:id - Remove a dish from the catalog.
pub async fn delete_dish(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    state.repo.delete_dish(id).await?;
    success(())
}
